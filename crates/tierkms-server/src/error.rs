use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tierkms_auth::{AuthError, Tier};
use tierkms_crypto::CryptoError;

use crate::api::ErrorBody;

/// Failures of a wrap or unwrap call.
///
/// `Forbidden` deliberately carries no detail: a denied caller learns nothing
/// about which credentials would have been accepted.
#[derive(Debug, Error)]
pub enum KmsError {
    #[error("{0}")]
    BadRequest(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    UnprocessableKey(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl KmsError {
    pub fn status(&self) -> StatusCode {
        match self {
            KmsError::BadRequest(_) => StatusCode::BAD_REQUEST,
            KmsError::Forbidden => StatusCode::FORBIDDEN,
            KmsError::UnprocessableKey(_) => StatusCode::UNPROCESSABLE_ENTITY,
            KmsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for KmsError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UnknownTier(tier) => KmsError::BadRequest(format!("unknown tier: {}", tier)),
            other => KmsError::Internal(other.to_string()),
        }
    }
}

impl From<CryptoError> for KmsError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Base64Decode(msg) => KmsError::BadRequest(msg),
            CryptoError::UnalignedKeyLength(_) => {
                KmsError::BadRequest("key length must be a multiple of 8 bytes".to_string())
            }
            CryptoError::KeyTooShort { min, .. } => {
                KmsError::BadRequest(format!("key size must be at least {} bytes", min))
            }
            CryptoError::IntegrityCheckFailed => {
                KmsError::UnprocessableKey("key failed integrity check".to_string())
            }
            other => KmsError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for KmsError {
    fn into_response(self) -> Response {
        let detail = match &self {
            // Internal details stay in the logs.
            KmsError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(ErrorBody { detail })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Config extraction failed: {0}")]
    Extract(String),

    #[error("Missing master key for tier {0}")]
    MissingMasterKey(Tier),

    #[error("Invalid master key for tier {tier}: {source}")]
    InvalidMasterKey {
        tier: Tier,
        #[source]
        source: CryptoError,
    },

    #[error("Invalid access tokens: {0}")]
    Auth(#[from] AuthError),

    #[error("TLS certificate and key paths are required to serve")]
    TlsRequired,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
