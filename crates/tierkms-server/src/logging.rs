use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, ServerError};

/// Install the global `tracing` subscriber. `filter` is an `EnvFilter`
/// directive such as `"info"` or `"tierkms_server=debug"`; when it does not
/// parse, `RUST_LOG` is tried instead. Repeated calls are ignored.
pub fn init_logging(filter: &str) -> Result<(), ServerError> {
    let filter = EnvFilter::try_new(filter)
        .or_else(|_| EnvFilter::try_from_default_env())
        .map_err(|err| ConfigError::Invalid(format!("log filter: {}", err)))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    Ok(())
}
