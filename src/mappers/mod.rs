pub mod cerner;
pub mod synthea;

use crate::condition::ConditionLinker;
use oncomap_transform::{AggregatePipeline, Bindings, BuildError, Mapper, Pipeline};
use std::sync::Arc;

/// Rule sets shipped with the crate, addressable by name from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Synthea,
    Cerner,
}

impl Builtin {
    pub const ALL: [Builtin; 2] = [Builtin::Synthea, Builtin::Cerner];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Synthea => synthea::NAME,
            Builtin::Cerner => cerner::NAME,
        }
    }

    /// Whether the rule set falls back to another mapper
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Builtin::Cerner)
    }

    /// Delegate used when configuration names none
    pub fn default_delegate(&self) -> Option<Builtin> {
        match self {
            Builtin::Synthea => None,
            Builtin::Cerner => Some(Builtin::Synthea),
        }
    }

    /// Build this rule set under `name`.
    ///
    /// `delegate` is only used by aggregate rule sets; without one they fall
    /// back to their default delegate.
    pub fn build(
        &self,
        name: &str,
        overrides: &Bindings,
        delegate: Option<Arc<dyn Mapper>>,
        linker: Arc<dyn ConditionLinker>,
    ) -> Result<Arc<dyn Mapper>, BuildError> {
        let mut rule_set = match self {
            Builtin::Synthea => synthea::rule_set(),
            Builtin::Cerner => cerner::rule_set(overrides, linker.clone())?,
        };
        rule_set.name = name.to_string();

        if !self.is_aggregate() {
            return Ok(Arc::new(Pipeline::build(rule_set, overrides)?));
        }

        let delegate = match (delegate, self.default_delegate()) {
            (Some(delegate), _) => delegate,
            (None, Some(fallback)) => {
                fallback.build(fallback.name(), &Bindings::new(), None, linker)?
            }
            (None, None) => return Ok(Arc::new(Pipeline::build(rule_set, overrides)?)),
        };

        Ok(Arc::new(AggregatePipeline::build(rule_set, overrides, delegate)?))
    }
}
