use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque bearer token presented by a caller on unwrap.
///
/// Never persisted. Zeroized on drop and redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token. Empty tokens mean "no credential" and yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            return None;
        }
        Some(Self(token))
    }

    /// Credential carried by an optional header value.
    pub fn from_header(value: Option<&str>) -> Option<Self> {
        value.and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
