use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, trace, warn};

use super::CREDENTIAL_HEADER;

/// Per-request access log. Bodies and header values are never recorded; only
/// the presence of a credential is.
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let credential = req.headers().contains_key(CREDENTIAL_HEADER);
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(target: "http", %method, %path, status, elapsed_ms, credential, "request failed");
    } else if response.status().is_client_error() {
        warn!(target: "http", %method, %path, status, elapsed_ms, credential, "request rejected");
    } else if path == "/health" {
        trace!(target: "http", %method, %path, status, elapsed_ms, credential, "request");
    } else {
        info!(target: "http", %method, %path, status, elapsed_ms, credential, "request");
    }
    response
}
