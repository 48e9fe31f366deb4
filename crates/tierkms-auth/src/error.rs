use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Access token must not be empty")]
    EmptyToken,

    #[error("Duplicate access token for tiers {first} and {second}")]
    DuplicateToken {
        first: crate::Tier,
        second: crate::Tier,
    },
}
