//! Named mappers built from configuration
//!
//! Delegation chains are resolved depth-first. Each walk keeps the names it
//! is currently resolving, so a mapper that (directly or transitively)
//! delegates to itself is reported as a configuration error instead of
//! recursing at conversion time.

use crate::condition::ConditionLinker;
use crate::config::{Config, ConfigError};
use crate::mappers::Builtin;
use oncomap_transform::Mapper;
use std::collections::HashMap;
use std::sync::Arc;

pub struct MapperRegistry {
    mappers: HashMap<String, Arc<dyn Mapper>>,
}

impl MapperRegistry {
    pub fn build(config: &Config, linker: Arc<dyn ConditionLinker>) -> Result<Self, ConfigError> {
        let mut built = HashMap::new();

        let mut names: Vec<&String> = config.mappers.keys().collect();
        names.sort();
        for name in names {
            let mut visiting = Vec::new();
            resolve(name, config, &linker, &mut built, &mut visiting)?;
        }

        tracing::info!("Built {} mappers", built.len());
        Ok(Self { mappers: built })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Mapper>> {
        self.mappers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

fn resolve(
    name: &str,
    config: &Config,
    linker: &Arc<dyn ConditionLinker>,
    built: &mut HashMap<String, Arc<dyn Mapper>>,
    visiting: &mut Vec<String>,
) -> Result<Arc<dyn Mapper>, ConfigError> {
    if let Some(mapper) = built.get(name) {
        return Ok(mapper.clone());
    }

    if let Some(start) = visiting.iter().position(|n| n == name) {
        let mut cycle = visiting[start..].to_vec();
        cycle.push(name.to_string());
        return Err(ConfigError::DelegationCycle(cycle));
    }

    // callers only pass configured names
    let Some(mapper_config) = config.mappers.get(name) else {
        return Err(ConfigError::UnknownDelegate {
            mapper: visiting.last().cloned().unwrap_or_default(),
            delegate: name.to_string(),
        });
    };

    let builtin =
        Builtin::from_name(&mapper_config.rule_set).ok_or_else(|| ConfigError::UnknownRuleSet {
            mapper: name.to_string(),
            rule_set: mapper_config.rule_set.clone(),
        })?;

    visiting.push(name.to_string());
    let delegate = match &mapper_config.delegate {
        Some(delegate) => {
            if !builtin.is_aggregate() {
                return Err(ConfigError::DelegateNotSupported {
                    mapper: name.to_string(),
                    rule_set: mapper_config.rule_set.clone(),
                });
            }
            if !config.mappers.contains_key(delegate) {
                return Err(ConfigError::UnknownDelegate {
                    mapper: name.to_string(),
                    delegate: delegate.clone(),
                });
            }
            Some(resolve(delegate, config, linker, built, visiting)?)
        }
        None => None,
    };
    visiting.pop();

    let mapper = builtin
        .build(name, &mapper_config.variables, delegate, linker.clone())
        .map_err(|source| ConfigError::Build {
            mapper: name.to_string(),
            source,
        })?;

    tracing::debug!("Built mapper '{}' from rule set '{}'", name, builtin.name());
    built.insert(name.to_string(), mapper.clone());
    Ok(mapper)
}
