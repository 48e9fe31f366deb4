//! Wrap and unwrap orchestration.
//!
//! Checks run in a fixed order: tier and key syntax, then authorization
//! (unwrap only), then the cryptographic transform. A malformed request is
//! rejected before its credential is ever evaluated, and the codec is never
//! reached unless every earlier check passed.

use tierkms_auth::{AuthorizationPolicy, Credential, Tier};
use tierkms_crypto::{
    base64_decode, base64_encode, unwrap_key, validate_key_length, wrap_key,
    MIN_PLAINTEXT_KEY_LENGTH, MIN_WRAPPED_KEY_LENGTH,
};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::{AuthMode, ServerConfig};
use crate::error::{ConfigError, KmsError};
use crate::keys::MasterKeyTable;

/// Stateless apart from the immutable key table and policy; share it as
/// `Arc<KmsService>` across any number of concurrent requests.
#[derive(Clone)]
pub struct KmsService {
    keys: MasterKeyTable,
    policy: AuthorizationPolicy,
}

impl KmsService {
    pub fn new(keys: MasterKeyTable, policy: AuthorizationPolicy) -> Self {
        Self { keys, policy }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let keys = config.master_key_table()?;
        let policy = config.authorization_policy()?;
        if config.use_demo_keys {
            warn!("serving with built-in demonstration master keys; never use them for real data");
        }
        if config.auth.mode == AuthMode::TierName {
            warn!("auth.mode = tier-name accepts tier identifiers as credentials");
        }
        info!(auth_mode = ?config.auth.mode, "key service ready");
        Ok(Self::new(keys, policy))
    }

    /// Wrap a base64 plaintext key under `tier_id`'s master key.
    ///
    /// Wrapping requires no credential.
    pub fn wrap(&self, tier_id: &str, key_b64: &str) -> Result<String, KmsError> {
        let tier = parse_tier(tier_id)?;
        let plaintext = decode_key(key_b64, MIN_PLAINTEXT_KEY_LENGTH)?;
        let wrapped = self.wrap_key(tier, &plaintext)?;
        Ok(base64_encode(&wrapped))
    }

    /// Unwrap a base64 wrapped key for a caller presenting `credential`.
    pub fn unwrap(
        &self,
        tier_id: &str,
        key_b64: &str,
        credential: Option<&Credential>,
    ) -> Result<String, KmsError> {
        let tier = parse_tier(tier_id)?;
        let wrapped = decode_key(key_b64, MIN_WRAPPED_KEY_LENGTH)?;
        let plaintext = self.unwrap_key(tier, &wrapped, credential)?;
        Ok(base64_encode(&plaintext))
    }

    pub fn wrap_key(&self, tier: Tier, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let wrapped = wrap_key(self.keys.get(tier), plaintext)?;
        debug!(tier = %tier, key_len = plaintext.len(), "wrapped key");
        Ok(wrapped)
    }

    pub fn unwrap_key(
        &self,
        tier: Tier,
        wrapped: &[u8],
        credential: Option<&Credential>,
    ) -> Result<Zeroizing<Vec<u8>>, KmsError> {
        validate_key_length(wrapped.len(), MIN_WRAPPED_KEY_LENGTH)?;

        if !self.policy.authorize(tier, credential) {
            warn!(
                tier = %tier,
                clearance = %self.policy.clearance(credential),
                "unwrap denied"
            );
            return Err(KmsError::Forbidden);
        }

        let plaintext = unwrap_key(self.keys.get(tier), wrapped).map_err(|e| {
            warn!(tier = %tier, error = %e, "unwrap rejected");
            KmsError::from(e)
        })?;
        debug!(tier = %tier, key_len = plaintext.len(), "unwrapped key");
        Ok(Zeroizing::new(plaintext))
    }
}

fn parse_tier(tier_id: &str) -> Result<Tier, KmsError> {
    Ok(tier_id.parse::<Tier>()?)
}

fn decode_key(key_b64: &str, min_len: usize) -> Result<Zeroizing<Vec<u8>>, KmsError> {
    let key = Zeroizing::new(base64_decode(key_b64)?);
    validate_key_length(key.len(), min_len)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierkms_crypto::MasterKey;

    fn service() -> KmsService {
        let keys = MasterKeyTable::try_from_fn(|tier| {
            MasterKey::from_bytes(&[tier as u8 + 1; 32])
        })
        .unwrap();
        KmsService::new(keys, AuthorizationPolicy::tier_names())
    }

    fn cred(s: &str) -> Option<Credential> {
        Credential::new(s)
    }

    #[test]
    fn round_trip_every_tier() {
        let svc = service();
        let key = base64_encode(&[0x5au8; 32]);
        for tier in Tier::ALL {
            let wrapped = svc.wrap(tier.as_str(), &key).unwrap();
            assert_eq!(base64_decode(&wrapped).unwrap().len(), 40);
            let unwrapped = svc
                .unwrap(tier.as_str(), &wrapped, cred(tier.as_str()).as_ref())
                .unwrap();
            assert_eq!(unwrapped, key);
        }
    }

    #[test]
    fn tiers_use_distinct_master_keys() {
        let svc = service();
        let key = base64_encode(&[0u8; 16]);
        let internal = svc.wrap("INTERNAL", &key).unwrap();
        let public = svc.wrap("PUBLIC", &key).unwrap();
        assert_ne!(internal, public);
        assert!(matches!(
            svc.unwrap("PUBLIC", &internal, None),
            Err(KmsError::UnprocessableKey(_))
        ));
    }

    #[test]
    fn all_zero_key_scenario() {
        let svc = service();
        let key = base64_encode(&[0u8; 32]);
        let wrapped = svc.wrap("INTERNAL", &key).unwrap();
        assert_eq!(
            svc.unwrap("INTERNAL", &wrapped, cred("INTERNAL").as_ref()).unwrap(),
            key
        );
        assert!(matches!(
            svc.unwrap("INTERNAL", &wrapped, cred("PUBLIC").as_ref()),
            Err(KmsError::Forbidden)
        ));
        assert!(matches!(
            svc.unwrap("INTERNAL", &wrapped, None),
            Err(KmsError::Forbidden)
        ));
    }

    #[test]
    fn validation_precedes_authorization() {
        let svc = service();
        assert!(matches!(
            svc.unwrap("RESTRICTED", "not base64!", None),
            Err(KmsError::BadRequest(_))
        ));
        let short = base64_encode(&[0u8; 16]);
        assert!(matches!(
            svc.unwrap("RESTRICTED", &short, None),
            Err(KmsError::BadRequest(_))
        ));
        assert!(matches!(
            svc.unwrap_key(Tier::Restricted, &[0u8; 20], None),
            Err(KmsError::BadRequest(_))
        ));
    }

    #[test]
    fn authorization_precedes_unwrap() {
        let svc = service();
        // Garbage ciphertext of a valid length: a denied caller sees 403, not 422.
        let garbage = base64_encode(&[0u8; 24]);
        assert!(matches!(
            svc.unwrap("CONFIDENTIAL", &garbage, cred("INTERNAL").as_ref()),
            Err(KmsError::Forbidden)
        ));
        assert!(matches!(
            svc.unwrap("CONFIDENTIAL", &garbage, cred("RESTRICTED").as_ref()),
            Err(KmsError::UnprocessableKey(_))
        ));
    }

    #[test]
    fn unknown_tier_rejected() {
        let svc = service();
        let key = base64_encode(&[0u8; 16]);
        assert!(matches!(svc.wrap("SECRET", &key), Err(KmsError::BadRequest(_))));
        assert!(matches!(svc.wrap("public", &key), Err(KmsError::BadRequest(_))));
        assert!(matches!(
            svc.unwrap("", &key, None),
            Err(KmsError::BadRequest(_))
        ));
    }

    #[test]
    fn wrap_length_boundaries() {
        let svc = service();
        assert!(matches!(
            svc.wrap("PUBLIC", &base64_encode(&[0u8; 15])),
            Err(KmsError::BadRequest(_))
        ));
        assert!(matches!(
            svc.wrap("PUBLIC", &base64_encode(&[0u8; 8])),
            Err(KmsError::BadRequest(_))
        ));
        assert!(svc.wrap("PUBLIC", &base64_encode(&[0u8; 16])).is_ok());
    }

    #[test]
    fn tampered_key_is_unprocessable_for_every_tier() {
        let svc = service();
        for tier in Tier::ALL {
            let wrapped = svc.wrap_key(tier, &[7u8; 24]).unwrap();
            for byte in 0..wrapped.len() {
                let mut tampered = wrapped.clone();
                tampered[byte] ^= 0x01;
                assert!(matches!(
                    svc.unwrap_key(tier, &tampered, cred("RESTRICTED").as_ref()),
                    Err(KmsError::UnprocessableKey(_))
                ));
            }
        }
    }
}
