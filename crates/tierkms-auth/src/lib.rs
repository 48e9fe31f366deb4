//! Tiered authorization for key unwrapping.
//!
//! This crate provides:
//! - The ordered privilege [`Tier`] enumeration
//! - Opaque bearer [`Credential`]s
//! - Credential verifiers that resolve a credential to a clearance tier
//! - The [`AuthorizationPolicy`] deciding whether a caller may unwrap under a tier

mod credential;
mod error;
mod policy;
mod tier;
mod verifier;

pub use credential::Credential;
pub use error::AuthError;
pub use policy::{is_cleared, AuthorizationPolicy};
pub use tier::Tier;
pub use verifier::{CredentialVerifier, StaticTokenVerifier, TierNameVerifier};
