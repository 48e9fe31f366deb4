use std::error::Error as StdError;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request as malformed (HTTP 400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The credential does not clear the requested tier (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The wrapped key failed its integrity check (HTTP 422).
    #[error("unprocessable key: {0}")]
    UnprocessableKey(String),

    #[error("server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether a later attempt of the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Unavailable(_))
    }

    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = remote_message(body);
        match status {
            400 => ClientError::BadRequest(message),
            403 => ClientError::Forbidden(message),
            422 => ClientError::UnprocessableKey(message),
            502..=504 => ClientError::Unavailable(format!("HTTP {}: {}", status, message)),
            _ => ClientError::Remote { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if is_tls_failure(&e) {
            // Reported as a connect error by reqwest, but retrying cannot help.
            ClientError::Transport(format!("TLS handshake failed: {}", e))
        } else if e.is_connect() {
            ClientError::Unavailable(e.to_string())
        } else if e.is_builder() {
            ClientError::Config(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Whether `err` or anything in its source chain is a rustls failure.
/// tokio-rustls surfaces those as `io::ErrorKind::InvalidData`.
fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(err) = source {
        if err.is::<rustls::Error>() {
            return true;
        }
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::InvalidData
                || io_err.get_ref().is_some_and(|inner| inner.is::<rustls::Error>())
            {
                return true;
            }
        }
        source = err.source();
    }
    false
}

const MAX_MESSAGE_LEN: usize = 256;

/// The server's `detail` field when present, otherwise the raw body.
fn remote_message(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
    let message = detail.unwrap_or_else(|| body.trim().to_string());
    match message.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message,
    }
}
