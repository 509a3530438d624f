//! Compiled, callable conversions
//!
//! [`Pipeline`] runs a compiled [`RuleSet`]: applicability check, first
//! matching rule, otherwise the default. [`AggregatePipeline`] layers a rule
//! set over another mapper, which becomes its default.

use crate::bindings::Bindings;
use crate::context::Context;
use crate::document::Document;
use crate::error::{BuildError, TransformError};
use crate::rule_set::{CompiledFilter, RuleSet, TransformFn};
use std::fmt;
use std::sync::Arc;

/// Anything that converts one focal document within its context
pub trait Mapper: Send + Sync {
    fn name(&self) -> &str;

    /// Convert `document` in place. Only the focal document is mutated.
    fn execute(&self, document: &mut Document, context: &Context<'_>) -> Result<(), TransformError>;

    /// The mapper this one falls back to, if any
    fn delegate(&self) -> Option<&Arc<dyn Mapper>> {
        None
    }
}

/// Names of `mapper` and every mapper it delegates to, outermost first
pub fn chain_of(mapper: &dyn Mapper) -> Vec<String> {
    let mut names = vec![mapper.name().to_string()];
    let mut next = mapper.delegate();
    while let Some(delegate) = next {
        names.push(delegate.name().to_string());
        next = delegate.delegate();
    }
    names
}

struct CompiledRule {
    filter: CompiledFilter,
    transform: TransformFn,
}

enum Fallback {
    None,
    Transform(TransformFn),
    Delegate(Arc<dyn Mapper>),
}

/// A rule set compiled against its resolved bindings
pub struct Pipeline {
    name: String,
    applies_if: CompiledFilter,
    rules: Vec<CompiledRule>,
    fallback: Fallback,
    bindings: Bindings,
}

impl Pipeline {
    /// Compile `rule_set` with `overrides` merged over its own bindings.
    ///
    /// Every filter is compiled here, so an unresolved `%var` fails the build
    /// rather than a later conversion.
    pub fn build(rule_set: RuleSet, overrides: &Bindings) -> Result<Self, BuildError> {
        let fallback = match rule_set.default.clone() {
            Some(transform) => Fallback::Transform(transform),
            None => Fallback::None,
        };
        Self::compile(rule_set, overrides, fallback)
    }

    fn compile(
        rule_set: RuleSet,
        overrides: &Bindings,
        fallback: Fallback,
    ) -> Result<Self, BuildError> {
        let bindings = rule_set.bindings.merged(overrides);

        let applies_if = rule_set
            .applies_if
            .compile(&bindings)
            .map_err(|source| BuildError::AppliesIf {
                rule_set: rule_set.name.clone(),
                source,
            })?;

        let rules = rule_set
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let filter = rule
                    .filter
                    .compile(&bindings)
                    .map_err(|source| BuildError::RuleFilter {
                        rule_set: rule_set.name.clone(),
                        index,
                        source,
                    })?;
                Ok(CompiledRule {
                    filter,
                    transform: rule.transform.clone(),
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        tracing::debug!(
            "Built pipeline '{}' with {} rules and {} variables",
            rule_set.name,
            rules.len(),
            bindings.len()
        );

        Ok(Self {
            name: rule_set.name,
            applies_if,
            rules,
            fallback,
            bindings,
        })
    }

    /// Bindings after overrides were merged
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Mapper for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        document: &mut Document,
        context: &Context<'_>,
    ) -> Result<(), TransformError> {
        if !self.applies_if.evaluate(document, context) {
            tracing::trace!("Pipeline '{}' does not apply to {}", self.name, document.kind);
            return Ok(());
        }

        if let Some((index, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.filter.evaluate(document, context))
        {
            tracing::debug!(
                "Pipeline '{}' rule {} matched {} ({})",
                self.name,
                index,
                document.kind,
                rule.filter
            );
            return (rule.transform)(document, context);
        }

        match &self.fallback {
            Fallback::None => {
                tracing::trace!("Pipeline '{}' has no default for {}", self.name, document.kind);
                Ok(())
            }
            Fallback::Transform(transform) => {
                tracing::trace!("Pipeline '{}' applying default to {}", self.name, document.kind);
                transform(document, context)
            }
            Fallback::Delegate(delegate) => {
                tracing::trace!(
                    "Pipeline '{}' delegating {} to '{}'",
                    self.name,
                    document.kind,
                    delegate.name()
                );
                delegate.execute(document, context)
            }
        }
    }

    fn delegate(&self) -> Option<&Arc<dyn Mapper>> {
        match &self.fallback {
            Fallback::Delegate(delegate) => Some(delegate),
            _ => None,
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

/// A pipeline whose default is another, already built mapper.
///
/// The delegate must exist before the aggregate is built, so a chain assembled
/// through this type is finite and acyclic.
pub struct AggregatePipeline {
    inner: Pipeline,
}

impl AggregatePipeline {
    /// Build over `delegate`. Any default declared on `rule_set` is replaced by
    /// the delegate.
    pub fn build(
        rule_set: RuleSet,
        overrides: &Bindings,
        delegate: Arc<dyn Mapper>,
    ) -> Result<Self, BuildError> {
        if rule_set.default.is_some() {
            tracing::warn!(
                "Rule set '{}' declares a default; delegating to '{}' instead",
                rule_set.name,
                delegate.name()
            );
        }
        let inner = Pipeline::compile(rule_set, overrides, Fallback::Delegate(delegate))?;
        Ok(Self { inner })
    }

    pub fn bindings(&self) -> &Bindings {
        self.inner.bindings()
    }

    pub fn rule_count(&self) -> usize {
        self.inner.rule_count()
    }
}

impl Mapper for AggregatePipeline {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn execute(
        &self,
        document: &mut Document,
        context: &Context<'_>,
    ) -> Result<(), TransformError> {
        self.inner.execute(document, context)
    }

    fn delegate(&self) -> Option<&Arc<dyn Mapper>> {
        self.inner.delegate()
    }
}

impl fmt::Debug for AggregatePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregatePipeline")
            .field("inner", &self.inner)
            .field("delegate", &self.delegate().map(|d| d.name().to_string()))
            .finish()
    }
}
