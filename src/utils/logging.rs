//! # Logging
//!
//! Installs a `tracing-subscriber` formatter for hosts that do not bring
//! their own. The encoder and decoder themselves emit nothing; events come
//! from dictionary construction and the streaming codec.
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{CodecError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a global subscriber according to `config`.
///
/// # Errors
/// Returns `CodecError::ConfigError` if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CodecError::ConfigError(format!("Failed to install logger: {e}")))?;

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}
