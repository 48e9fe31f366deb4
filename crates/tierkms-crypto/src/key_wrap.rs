//! AES Key Wrap (RFC 3394) over raw key bytes.
//!
//! Wrapped key wire format: [integrity semiblock:8][wrapped semiblocks:n*8].
//! Wrapping is deterministic: the same master key and plaintext always produce
//! the same ciphertext. The default RFC 3394 IV doubles as the integrity check
//! on unwrap, so a wrong master key, tampered ciphertext or truncated input all
//! surface as [`CryptoError::IntegrityCheckFailed`].

use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::master_key::MasterKey;
use crate::types::{wrapped_len, MIN_PLAINTEXT_KEY_LENGTH, MIN_WRAPPED_KEY_LENGTH, SEMIBLOCK_LENGTH};

enum Kek {
    Aes128(KekAes128),
    Aes192(KekAes192),
    Aes256(KekAes256),
}

impl Kek {
    fn new(master_key: &MasterKey) -> Result<Self, CryptoError> {
        let bytes = master_key.as_bytes();
        let kek = match bytes.len() {
            16 => {
                let mut arr: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidMasterKeyLength(bytes.len()))?;
                let kek = KekAes128::from(arr);
                arr.zeroize();
                Kek::Aes128(kek)
            }
            24 => {
                let mut arr: [u8; 24] = bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidMasterKeyLength(bytes.len()))?;
                let kek = KekAes192::from(arr);
                arr.zeroize();
                Kek::Aes192(kek)
            }
            32 => {
                let mut arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidMasterKeyLength(bytes.len()))?;
                let kek = KekAes256::from(arr);
                arr.zeroize();
                Kek::Aes256(kek)
            }
            other => return Err(CryptoError::InvalidMasterKeyLength(other)),
        };
        Ok(kek)
    }

    fn wrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Kek::Aes128(kek) => kek.wrap(data, out),
            Kek::Aes192(kek) => kek.wrap(data, out),
            Kek::Aes256(kek) => kek.wrap(data, out),
        }
    }

    fn unwrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Kek::Aes128(kek) => kek.unwrap(data, out),
            Kek::Aes192(kek) => kek.unwrap(data, out),
            Kek::Aes256(kek) => kek.unwrap(data, out),
        }
    }
}

/// Check that `len` is a whole number of semiblocks and at least `min` bytes.
pub fn validate_key_length(len: usize, min: usize) -> Result<(), CryptoError> {
    if len % SEMIBLOCK_LENGTH != 0 {
        return Err(CryptoError::UnalignedKeyLength(len));
    }
    if len < min {
        return Err(CryptoError::KeyTooShort { min, got: len });
    }
    Ok(())
}

/// Wrap a plaintext key under a master key.
///
/// # Arguments
/// * `master_key` - AES-128/192/256 key-encryption key
/// * `plaintext` - Key material, a multiple of 8 bytes and at least 16 bytes
///
/// # Returns
/// Wrapped key, exactly 8 bytes longer than `plaintext`
pub fn wrap_key(master_key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    validate_key_length(plaintext.len(), MIN_PLAINTEXT_KEY_LENGTH)?;

    let kek = Kek::new(master_key)?;
    let mut wrapped = vec![0u8; wrapped_len(plaintext.len())];
    kek.wrap(plaintext, &mut wrapped)
        .map_err(|e| CryptoError::WrapFailed(format!("{:?}", e)))?;
    Ok(wrapped)
}

/// Unwrap a wrapped key and verify its integrity semiblock.
///
/// # Arguments
/// * `master_key` - The key-encryption key the material was wrapped under
/// * `wrapped` - Wrapped key, a multiple of 8 bytes and at least 24 bytes
///
/// # Returns
/// The plaintext key, 8 bytes shorter than `wrapped`
pub fn unwrap_key(master_key: &MasterKey, wrapped: &[u8]) -> Result<Vec<u8>, CryptoError> {
    validate_key_length(wrapped.len(), MIN_WRAPPED_KEY_LENGTH)?;

    let kek = Kek::new(master_key)?;
    let mut plaintext = vec![0u8; wrapped.len() - SEMIBLOCK_LENGTH];
    // Lengths are validated above; any remaining failure is the integrity check.
    if kek.unwrap(wrapped, &mut plaintext).is_err() {
        plaintext.zeroize();
        return Err(CryptoError::IntegrityCheckFailed);
    }
    Ok(plaintext)
}
