use crate::config::{ConfigError, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::{self, prelude::*, EnvFilter};

/// Install the global `tracing` subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// is kept.
pub fn init(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| ConfigError::InvalidLogLevel(format!("{}: {}", config.level, e)))?;

    let installed = if config.log_to_file {
        let file = std::fs::File::create(&config.log_file_path).map_err(|source| ConfigError::Io {
            path: config.log_file_path.clone(),
            source,
        })?;

        // Create a file appender
        let file_appender = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(Arc::new(file));

        // Create a stdout appender
        let stdout_appender = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_appender)
            .with(stdout_appender)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!("Logging initialised at level '{}'", config.level);
    }
    Ok(installed)
}
