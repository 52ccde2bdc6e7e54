//! Global tracing subscriber setup.

use crate::config;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber, filtering events by the configured log level unless
/// `RUST_LOG` says otherwise.
pub fn init() -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::LOG_LEVEL.as_str()));

    let subscriber = fmt().with_env_filter(filter).with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(service = config::SERVICE_NAME.as_str(), "tracer initialized");
    Ok(())
}
