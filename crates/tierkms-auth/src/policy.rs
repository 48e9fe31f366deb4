//! Unwrap authorization.
//!
//! Every caller holds at least `PUBLIC` clearance; a verified credential can
//! raise it. A caller may unwrap under tier `T` iff its clearance is `>= T`.

use std::sync::Arc;

use crate::credential::Credential;
use crate::tier::Tier;
use crate::verifier::{CredentialVerifier, TierNameVerifier};

/// Whether a caller with `clearance` may unwrap under `requested`.
///
/// A missing clearance counts as `PUBLIC`, which is what makes `PUBLIC`
/// unwraps credential-free.
pub fn is_cleared(requested: Tier, clearance: Option<Tier>) -> bool {
    clearance.unwrap_or(Tier::Public) >= requested
}

/// Decides whether a credential may unwrap key material under a tier.
#[derive(Clone)]
pub struct AuthorizationPolicy {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthorizationPolicy {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Policy that accepts tier identifiers as credentials.
    pub fn tier_names() -> Self {
        Self::new(Arc::new(TierNameVerifier))
    }

    /// Clearance of a caller; `PUBLIC` when there is no usable credential.
    pub fn clearance(&self, credential: Option<&Credential>) -> Tier {
        credential
            .and_then(|c| self.verifier.clearance(c))
            .unwrap_or(Tier::Public)
    }

    pub fn authorize(&self, requested: Tier, credential: Option<&Credential>) -> bool {
        is_cleared(requested, Some(self.clearance(credential)))
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::tier_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::StaticTokenVerifier;

    fn cred(s: &str) -> Option<Credential> {
        Credential::new(s)
    }

    #[test]
    fn public_needs_no_credential() {
        let policy = AuthorizationPolicy::tier_names();
        assert!(policy.authorize(Tier::Public, None));
        assert!(policy.authorize(Tier::Public, cred("garbage").as_ref()));
        for tier in Tier::ALL {
            assert!(policy.authorize(Tier::Public, cred(tier.as_str()).as_ref()));
        }
    }

    #[test]
    fn no_credential_only_public() {
        let policy = AuthorizationPolicy::tier_names();
        for tier in [Tier::Internal, Tier::Confidential, Tier::Restricted] {
            assert!(!policy.authorize(tier, None));
            assert!(!policy.authorize(tier, cred("").as_ref()));
        }
    }

    #[test]
    fn garbled_credential_only_public() {
        let policy = AuthorizationPolicy::tier_names();
        for garbled in ["internal", "ROOT", "RESTRICTED\0", "INTERNAL,RESTRICTED"] {
            assert_eq!(policy.clearance(cred(garbled).as_ref()), Tier::Public);
            assert!(!policy.authorize(Tier::Internal, cred(garbled).as_ref()));
        }
    }

    #[test]
    fn confidential_credential() {
        let policy = AuthorizationPolicy::tier_names();
        let c = cred("CONFIDENTIAL");
        assert!(policy.authorize(Tier::Public, c.as_ref()));
        assert!(policy.authorize(Tier::Internal, c.as_ref()));
        assert!(policy.authorize(Tier::Confidential, c.as_ref()));
        assert!(!policy.authorize(Tier::Restricted, c.as_ref()));
    }

    #[test]
    fn authorization_matches_source_table() {
        let policy = AuthorizationPolicy::tier_names();
        for requested in Tier::ALL {
            for presented in Tier::ALL {
                let allowed = policy.authorize(requested, cred(presented.as_str()).as_ref());
                let expected = requested == Tier::Public
                    || requested.at_or_above().any(|t| t == presented);
                assert_eq!(allowed, expected, "{} presenting {}", requested, presented);
            }
        }
    }

    #[test]
    fn authorization_is_monotonic() {
        let policy = AuthorizationPolicy::tier_names();
        for presented in Tier::ALL {
            let c = cred(presented.as_str());
            for requested in Tier::ALL {
                if policy.authorize(requested, c.as_ref()) {
                    for lower in Tier::ALL.into_iter().filter(|t| *t <= requested) {
                        assert!(policy.authorize(lower, c.as_ref()));
                    }
                }
            }
        }
    }

    #[test]
    fn static_token_policy_keeps_tier_order() {
        let verifier = StaticTokenVerifier::new([("k-conf", Tier::Confidential)]).unwrap();
        let policy = AuthorizationPolicy::new(Arc::new(verifier));
        assert!(policy.authorize(Tier::Internal, cred("k-conf").as_ref()));
        assert!(policy.authorize(Tier::Confidential, cred("k-conf").as_ref()));
        assert!(!policy.authorize(Tier::Restricted, cred("k-conf").as_ref()));
        // Tier names are not secrets under this policy.
        assert!(!policy.authorize(Tier::Internal, cred("INTERNAL").as_ref()));
    }

    #[test]
    fn is_cleared_treats_none_as_public() {
        assert!(is_cleared(Tier::Public, None));
        assert!(!is_cleared(Tier::Internal, None));
        assert!(is_cleared(Tier::Internal, Some(Tier::Restricted)));
    }
}
