//! HTTPS client for a tierkms server.
//!
//! [`KmsClient`] turns wrap and unwrap into single outbound calls: raw bytes
//! in, raw bytes out, base64 on the wire. Calls are never retried; use
//! [`ClientError::is_retryable`] to decide whether a failure is worth a
//! second attempt.

mod client;
mod config;
mod error;
mod wrapper;

pub use client::KmsClient;
pub use config::KmsClientConfig;
pub use error::ClientError;
pub use tierkms_auth::Tier;
pub use wrapper::KeyWrapper;

/// Header carrying the caller's credential.
pub const CREDENTIAL_HEADER: &str = "x-api-key";
