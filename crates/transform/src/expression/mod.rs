//! Compiled filter expressions
//!
//! Supports the small path-expression subset used by mapping rule sets:
//!
//! - `Kind.path.to.field`: dotted field access guarded by the resource kind;
//!   array-valued fields are flattened while navigating
//! - `<path> = 'literal'`: true if any selected value equals the literal
//! - `<path> in %var`: true if any selected value is in the bound set `var`
//! - `<path>.where($this[.field] = 'a' or $this[.field] in %var ...)`: keeps
//!   the elements satisfying at least one condition
//!
//! A bare path is true when it selects at least one value. Expressions are
//! compiled once; variables are resolved at compile time so an unknown `%var`
//! is reported before any document is evaluated.

mod parser;

use crate::bindings::Bindings;
use crate::context::Context;
use crate::document::Document;
use crate::error::ExpressionError;
use serde_json::Value;
use std::fmt;

/// A compiled filter expression
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    root: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Path(Path),
    Equals {
        path: Path,
        literal: String,
    },
    Membership {
        path: Path,
        var: String,
        values: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Path {
    kind: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Field(String),
    Where(Vec<Condition>),
}

/// One `$this[.path] <test>` term inside `where(...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Condition {
    path: Vec<String>,
    test: Test,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Test {
    Equals(String),
    Membership { var: String, values: Vec<String> },
}

impl Expression {
    /// Compile `source`, resolving every `%var` against `bindings`
    pub fn compile(source: &str, bindings: &Bindings) -> Result<Self, ExpressionError> {
        let root = parser::parse(source, bindings)?;
        tracing::trace!("Compiled expression: {}", source);
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Names of the variables this expression references
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let path = match &self.root {
            Node::Path(path) | Node::Equals { path, .. } => path,
            Node::Membership { path, var, .. } => {
                names.push(var.as_str());
                path
            }
        };
        for step in &path.steps {
            if let Step::Where(conditions) = step {
                for condition in conditions {
                    if let Test::Membership { var, .. } = &condition.test {
                        names.push(var.as_str());
                    }
                }
            }
        }
        names
    }

    /// Evaluate against `document`. A kind mismatch is `false`, never an error.
    pub fn matches(&self, document: &Document) -> bool {
        let matched = match &self.root {
            Node::Path(path) => path.with_selection(document, |values| !values.is_empty()),
            Node::Equals { path, literal } => path.with_selection(document, |values| {
                values.iter().any(|v| value_equals(v, literal))
            }),
            Node::Membership { values: set, path, .. } => {
                path.with_selection(document, |values| any_in(values, set))
            }
        };
        matched.unwrap_or(false)
    }

    /// Values selected by the expression's path, or `None` on a kind mismatch
    pub fn select(&self, document: &Document) -> Option<Vec<Value>> {
        match &self.root {
            Node::Path(path) | Node::Equals { path, .. } | Node::Membership { path, .. } => path
                .with_selection(document, |values| {
                    values.iter().map(|v| (*v).clone()).collect()
                }),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile and evaluate in one step.
///
/// Expressions only read the focal document; `context` is accepted so callers
/// can treat expressions and native predicates alike.
pub fn evaluate(
    source: &str,
    document: &Document,
    _context: &Context<'_>,
    bindings: &Bindings,
) -> Result<bool, ExpressionError> {
    Ok(Expression::compile(source, bindings)?.matches(document))
}

static KIND_MATCH: Value = Value::Bool(true);

impl Path {
    /// Run `f` over the flattened values this path selects. `None` on a kind
    /// mismatch.
    fn with_selection<R>(
        &self,
        document: &Document,
        f: impl FnOnce(&[&Value]) -> R,
    ) -> Option<R> {
        if document.kind.as_str() != self.kind {
            return None;
        }

        let mut steps = self.steps.iter();
        let root = match steps.next() {
            // A bare kind selects nothing to compare, but still matches as a path
            None => return Some(f(&[&KIND_MATCH])),
            Some(Step::Field(name)) => document.member(name),
            // the parser never produces a leading where()
            Some(Step::Where(_)) => return Some(f(&[])),
        };

        let mut current = Vec::new();
        if let Some(value) = root.as_deref() {
            push_flat(&mut current, value);
        }

        for step in steps {
            if current.is_empty() {
                break;
            }
            current = match step {
                Step::Field(name) => field(&current, name),
                Step::Where(conditions) => current
                    .into_iter()
                    .filter(|item| conditions.iter().any(|c| c.holds(item)))
                    .collect(),
            };
        }

        Some(f(&current))
    }
}

impl Condition {
    fn holds(&self, item: &Value) -> bool {
        let mut values = vec![item];
        for name in &self.path {
            values = field(&values, name);
        }
        match &self.test {
            Test::Equals(literal) => values.iter().any(|v| value_equals(v, literal)),
            Test::Membership { values: set, .. } => any_in(&values, set),
        }
    }
}

fn field<'d>(items: &[&'d Value], name: &str) -> Vec<&'d Value> {
    let mut out = Vec::new();
    for item in items {
        if let Some(value) = item.get(name) {
            push_flat(&mut out, value);
        }
    }
    out
}

fn push_flat<'d>(out: &mut Vec<&'d Value>, value: &'d Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                push_flat(out, item);
            }
        }
        other => out.push(other),
    }
}

/// Exact, case-sensitive string comparison; non-string values never match
fn value_equals(value: &Value, literal: &str) -> bool {
    value.as_str() == Some(literal)
}

fn any_in(values: &[&Value], set: &[String]) -> bool {
    values
        .iter()
        .any(|value| set.iter().any(|candidate| value_equals(value, candidate)))
}
