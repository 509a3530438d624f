//! Oncology data-profile conversion
//!
//! Built-in mappers that move Synthea and Cerner exports onto the oncology
//! core profiles, plus the configuration and logging that wire them into
//! a named [`MapperRegistry`]. The rule engine itself lives in
//! [`transform`].

pub mod condition;
pub mod config;
pub mod logging;
pub mod mappers;
pub mod profiles;
pub mod registry;

pub use oncomap_transform as transform;

pub use crate::condition::{CancerConditionLinker, ConditionLinker, NoConditionLinker};
pub use crate::config::{Config, ConfigError};
pub use crate::registry::MapperRegistry;

use std::sync::Arc;

/// Initialise logging and build every configured mapper.
///
/// Mappers link staging findings to cancer conditions using the Synthea
/// disorder codes. A subscriber that is already installed is left in place.
pub fn init(config: &Config) -> Result<MapperRegistry, ConfigError> {
    logging::init(&config.logging)?;

    tracing::info!("Starting oncomap with {} configured mappers", config.mappers.len());

    MapperRegistry::build(config, Arc::new(CancerConditionLinker::default()))
}
