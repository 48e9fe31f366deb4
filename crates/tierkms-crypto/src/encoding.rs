use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::Engine as _;

use crate::error::CryptoError;

/// Standard alphabet with canonical padding, tolerating non-zero bits in the
/// final symbol as most decoders do.
const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Standard base64 encode bytes with padding.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Strict standard base64 decode.
///
/// Rejects characters outside the standard alphabet, missing or misplaced
/// padding, and embedded whitespace.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    DECODER
        .decode(s)
        .map_err(|e| CryptoError::Base64Decode(e.to_string()))
}
