use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tracing::{error, info};

use super::handlers::{handle_health, handle_unwrap, handle_wrap};
use super::middleware::logging_middleware;
use super::API_PREFIX;
use crate::config::ServerConfig;
use crate::error::{ConfigError, ServerError};
use crate::service::KmsService;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub fn build_router(service: Arc<KmsService>, body_limit_bytes: usize) -> Router {
    let api = Router::new()
        .route("/wrap/:tier_id", post(handle_wrap))
        .route("/unwrap/:tier_id", post(handle_unwrap));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(axum::middleware::from_fn(logging_middleware))
        .with_state(service)
}

/// Serve over TLS until ctrl-c. Plain HTTP is not offered.
pub async fn serve(config: &ServerConfig, service: Arc<KmsService>) -> Result<(), ServerError> {
    let tls = config.tls.as_ref().ok_or(ConfigError::TlsRequired)?;
    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

    let app = build_router(service, config.body_limit_bytes);
    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    info!(addr = %config.listen_addr, "HTTPS server listening");
    axum_server::bind_rustls(config.listen_addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            error!(addr = %config.listen_addr, error = %err, "HTTPS server terminated");
            ServerError::Io(err)
        })?;
    info!("HTTPS server stopped");
    Ok(())
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown requested");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
