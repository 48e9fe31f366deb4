//! Master (key-encryption) keys.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::MASTER_KEY_LENGTHS;

/// A symmetric AES key used to wrap and unwrap data encryption keys.
///
/// Read-only once constructed. Zeroized on drop and redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Build a master key from raw bytes (16, 24 or 32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if !MASTER_KEY_LENGTHS.contains(&bytes.len()) {
            return Err(CryptoError::InvalidMasterKeyLength(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Build a master key from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes =
            hex::decode(s.trim()).map_err(|e| CryptoError::InvalidMasterKeyEncoding(e.to_string()))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key size in bits.
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey(aes-{}, ***)", self.bits())
    }
}
