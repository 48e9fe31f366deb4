//! Tier-gated key wrapping service.
//!
//! [`KmsService`] wraps data encryption keys under one master key per
//! [`Tier`](tierkms_auth::Tier) and unwraps them for callers whose credential
//! clears that tier. The [`api`] module exposes it over HTTPS.

pub mod api;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod service;

pub use config::ServerConfig;
pub use error::{ConfigError, KmsError, ServerError};
pub use keys::MasterKeyTable;
pub use service::KmsService;
