mod logging_config;
pub mod config;

pub use config::{Config, ConfigError, MapperConfig};
pub use logging_config::LoggingConfig;
