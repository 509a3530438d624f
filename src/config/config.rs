use crate::config::logging_config::LoggingConfig;
use oncomap_transform::{Bindings, BuildError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Mapper '{0}' must name a rule set")]
    InvalidMapper(String),

    #[error("Invalid log level {0}")]
    InvalidLogLevel(String),

    #[error("log_to_file is enabled but log_file_path is empty")]
    MissingLogFilePath,

    #[error("Mapper '{mapper}' uses unknown rule set '{rule_set}'")]
    UnknownRuleSet { mapper: String, rule_set: String },

    #[error("Mapper '{mapper}' delegates to unknown mapper '{delegate}'")]
    UnknownDelegate { mapper: String, delegate: String },

    #[error("Mapper '{mapper}' uses rule set '{rule_set}', which cannot delegate")]
    DelegateNotSupported { mapper: String, rule_set: String },

    #[error("Delegation cycle: {}", .0.join(" -> "))]
    DelegationCycle(Vec<String>),

    #[error("Failed to build mapper '{mapper}': {source}")]
    Build {
        mapper: String,
        #[source]
        source: BuildError,
    },
}

/// One named mapper: a built-in rule set, an optional delegate mapper and
/// variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct MapperConfig {
    pub rule_set: String,
    #[serde(default)]
    pub delegate: Option<String>,
    #[serde(default)]
    pub variables: Bindings,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub mappers: HashMap<String, MapperConfig>,
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks; delegate resolution happens when mappers are built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.log_to_file && self.logging.log_file_path.trim().is_empty() {
            return Err(ConfigError::MissingLogFilePath);
        }

        for (name, mapper) in &self.mappers {
            if mapper.rule_set.trim().is_empty() {
                return Err(ConfigError::InvalidMapper(name.clone()));
            }
        }
        Ok(())
    }
}
