//! Error types for the mapping engine

use thiserror::Error;

/// Errors raised while compiling a filter expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("Failed to parse expression '{expr}': {message}")]
    Parse { expr: String, message: String },

    #[error("Unresolved variable '%{name}' in expression '{expr}'")]
    UnresolvedVariable { name: String, expr: String },
}

impl ExpressionError {
    pub fn parse(expr: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while building a pipeline from a rule set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Invalid applicability filter for rule set '{rule_set}': {source}")]
    AppliesIf {
        rule_set: String,
        #[source]
        source: ExpressionError,
    },

    #[error("Invalid filter for rule {index} of rule set '{rule_set}': {source}")]
    RuleFilter {
        rule_set: String,
        index: usize,
        #[source]
        source: ExpressionError,
    },

    #[error("Invalid lookup expression in rule set '{rule_set}': {source}")]
    Lookup {
        rule_set: String,
        #[source]
        source: ExpressionError,
    },
}

/// Errors raised by a transform while converting a document
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{kind} document is missing required field '{field}'")]
    MissingField { kind: String, field: String },

    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl TransformError {
    /// Create a new missing-field error
    pub fn missing_field(kind: impl ToString, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind: kind.to_string(),
            field: field.into(),
        }
    }

    /// Create a new custom error
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}
