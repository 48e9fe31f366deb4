//! Key wrapping primitives for tierkms.
//!
//! This crate provides:
//! - AES Key Wrap (RFC 3394) over raw key bytes
//! - Master (key-encryption) keys that zeroize on drop
//! - Standard base64 helpers used on the wire

mod encoding;
mod error;
mod key_wrap;
mod master_key;
mod types;

pub use encoding::{base64_decode, base64_encode};
pub use error::CryptoError;
pub use key_wrap::{unwrap_key, validate_key_length, wrap_key};
pub use master_key::MasterKey;
pub use types::{
    wrapped_len, MASTER_KEY_LENGTHS, MIN_PLAINTEXT_KEY_LENGTH, MIN_WRAPPED_KEY_LENGTH,
    SEMIBLOCK_LENGTH,
};
