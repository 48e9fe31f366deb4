use async_trait::async_trait;
use tierkms_auth::Tier;

use crate::client::KmsClient;
use crate::error::ClientError;

/// Key wrapping as seen by an encryption pipeline: bytes in, bytes out,
/// under a named tier.
#[async_trait]
pub trait KeyWrapper: Send + Sync {
    async fn wrap(&self, key: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError>;

    async fn unwrap(&self, wrapped: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError>;
}

#[async_trait]
impl KeyWrapper for KmsClient {
    async fn wrap(&self, key: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError> {
        self.wrap_key(key, tier).await
    }

    async fn unwrap(&self, wrapped: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError> {
        self.unwrap_key(wrapped, tier).await
    }
}
