//! Rule set descriptors
//!
//! A [`RuleSet`] is configuration: a coarse applicability filter, ordered
//! `(filter, transform)` rules, an optional default transform and the default
//! variable bindings its expressions are written against. It is turned into a
//! callable [`Pipeline`](crate::pipeline::Pipeline) by compiling it once.

use crate::bindings::Bindings;
use crate::context::Context;
use crate::document::Document;
use crate::error::{ExpressionError, TransformError};
use crate::expression::Expression;
use std::fmt;
use std::sync::Arc;

/// Transform capability: mutates the focal document in place
pub type TransformFn =
    Arc<dyn Fn(&mut Document, &Context<'_>) -> Result<(), TransformError> + Send + Sync>;

/// Native predicate capability
pub type PredicateFn = Arc<dyn Fn(&Document, &Context<'_>) -> bool + Send + Sync>;

/// Filter as declared in a rule set
#[derive(Clone)]
pub enum Filter {
    /// Applies to every document
    Always,
    /// Expression source, compiled when the pipeline is built
    Expression(String),
    Predicate(PredicateFn),
}

impl Filter {
    pub fn expr(source: impl Into<String>) -> Self {
        Filter::Expression(source.into())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Document, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(predicate))
    }

    pub(crate) fn compile(&self, bindings: &Bindings) -> Result<CompiledFilter, ExpressionError> {
        Ok(match self {
            Filter::Always => CompiledFilter::Always,
            Filter::Expression(source) => {
                CompiledFilter::Expression(Expression::compile(source, bindings)?)
            }
            Filter::Predicate(predicate) => CompiledFilter::Predicate(predicate.clone()),
        })
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Always => f.write_str("Always"),
            Filter::Expression(source) => f.debug_tuple("Expression").field(source).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Filter ready for evaluation
#[derive(Clone)]
pub(crate) enum CompiledFilter {
    Always,
    Expression(Expression),
    Predicate(PredicateFn),
}

impl CompiledFilter {
    pub(crate) fn evaluate(&self, document: &Document, context: &Context<'_>) -> bool {
        match self {
            CompiledFilter::Always => true,
            CompiledFilter::Expression(expr) => expr.matches(document),
            CompiledFilter::Predicate(predicate) => predicate(document, context),
        }
    }
}

impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledFilter::Always => f.write_str("<always>"),
            CompiledFilter::Expression(expr) => write!(f, "{}", expr),
            CompiledFilter::Predicate(_) => f.write_str("<predicate>"),
        }
    }
}

#[derive(Clone)]
pub struct Rule {
    pub filter: Filter,
    pub transform: TransformFn,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("filter", &self.filter).finish_non_exhaustive()
    }
}

/// Ordered rules plus a default, guarded by one applicability filter
#[derive(Clone)]
pub struct RuleSet {
    pub name: String,
    pub applies_if: Filter,
    pub rules: Vec<Rule>,
    pub default: Option<TransformFn>,
    pub bindings: Bindings,
}

impl RuleSet {
    /// An empty rule set that applies to every document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applies_if: Filter::Always,
            rules: Vec::new(),
            default: None,
            bindings: Bindings::new(),
        }
    }

    pub fn applies_if(mut self, filter: Filter) -> Self {
        self.applies_if = filter;
        self
    }

    pub fn bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Append a rule; declaration order is precedence order
    pub fn rule<F>(mut self, filter: Filter, transform: F) -> Self
    where
        F: Fn(&mut Document, &Context<'_>) -> Result<(), TransformError> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            filter,
            transform: Arc::new(transform),
        });
        self
    }

    pub fn default_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&mut Document, &Context<'_>) -> Result<(), TransformError> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("applies_if", &self.applies_if)
            .field("rules", &self.rules)
            .field("default", &self.default.is_some())
            .field("bindings", &self.bindings)
            .finish()
    }
}
