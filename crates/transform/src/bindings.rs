use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named sets of literal codes referenced from filter expressions as `%name`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    vars: BTreeMap<String, Vec<String>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.insert(name, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.vars.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.vars.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Merge `overrides` over these bindings; an override replaces the whole
    /// set of the same name.
    pub fn merged(&self, overrides: &Bindings) -> Bindings {
        let mut vars = self.vars.clone();
        for (name, values) in &overrides.vars {
            vars.insert(name.clone(), values.clone());
        }
        Bindings { vars }
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        Bindings {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
