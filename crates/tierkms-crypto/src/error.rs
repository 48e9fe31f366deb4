use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid master key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidMasterKeyLength(usize),

    #[error("Invalid master key encoding: {0}")]
    InvalidMasterKeyEncoding(String),

    #[error("Key length must be a multiple of 8 bytes, got {0}")]
    UnalignedKeyLength(usize),

    #[error("Key size must be at least {min} bytes, got {got}")]
    KeyTooShort { min: usize, got: usize },

    #[error("AES-KW wrap failed: {0}")]
    WrapFailed(String),

    #[error("AES-KW integrity check failed")]
    IntegrityCheckFailed,

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
}
