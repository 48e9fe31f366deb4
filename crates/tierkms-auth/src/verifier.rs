//! Credential verification: credential -> clearance tier.

use subtle::ConstantTimeEq;

use crate::credential::Credential;
use crate::error::AuthError;
use crate::tier::Tier;

/// Resolves a presented credential to the highest tier it is cleared for.
///
/// Returning `None` means the credential carries no privilege; the caller is
/// then treated like an anonymous one.
pub trait CredentialVerifier: Send + Sync {
    fn clearance(&self, credential: &Credential) -> Option<Tier>;
}

/// The credential is itself a tier identifier.
///
/// A caller presenting `"CONFIDENTIAL"` is cleared for `CONFIDENTIAL` and
/// everything below it. There is no secret binding: anyone who knows the tier
/// names holds every tier. Deployments should configure
/// [`StaticTokenVerifier`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierNameVerifier;

impl CredentialVerifier for TierNameVerifier {
    fn clearance(&self, credential: &Credential) -> Option<Tier> {
        credential.as_str().parse().ok()
    }
}

/// Secret access tokens, each bound to a tier.
pub struct StaticTokenVerifier {
    tokens: Vec<(Credential, Tier)>,
}

impl StaticTokenVerifier {
    /// Build from `(token, tier)` pairs. Tokens must be non-empty and unique.
    pub fn new<I, S>(tokens: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (S, Tier)>,
        S: Into<String>,
    {
        let mut entries: Vec<(Credential, Tier)> = Vec::new();
        for (token, tier) in tokens {
            let credential = Credential::new(token).ok_or(AuthError::EmptyToken)?;
            if let Some((_, existing)) = entries.iter().find(|(c, _)| c == &credential) {
                return Err(AuthError::DuplicateToken {
                    first: *existing,
                    second: tier,
                });
            }
            entries.push((credential, tier));
        }
        Ok(Self { tokens: entries })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn clearance(&self, credential: &Credential) -> Option<Tier> {
        // Compare against every token so timing does not depend on which one matched.
        let presented = credential.as_str().as_bytes();
        self.tokens
            .iter()
            .filter(|(token, _)| bool::from(token.as_str().as_bytes().ct_eq(presented)))
            .map(|(_, tier)| *tier)
            .max()
    }
}
