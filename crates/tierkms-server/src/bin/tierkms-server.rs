use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tierkms_server::config::CONFIG_PATH_ENV;
use tierkms_server::logging::init_logging;
use tierkms_server::{api, KmsService, ServerConfig, ServerError};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "tierkms-server")]
#[command(about = "Tier-gated key wrapping service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Log filter (trace, debug, info, warn, error, or EnvFilter directives)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "tierkms-server exited");
            eprintln!("tierkms-server: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(level) = cli.log_level {
        config.log_filter = level;
    }
    init_logging(&config.log_filter)?;

    // axum-server is built without a default provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let service = Arc::new(KmsService::from_config(&config)?);
    api::serve(&config, service).await
}
