//! Rule-dispatch and transformation engine for clinical resource graphs
//!
//! This crate converts resources from one data-profile convention to another.
//! A [`RuleSet`] pairs filter expressions with transforms; a [`Pipeline`]
//! compiles it against its variable bindings and picks the first matching
//! rule for each document, falling back to a default transform or, for an
//! [`AggregatePipeline`], to another mapper.
//!
//! # Features
//! - Compiled filter expressions over dotted paths, with `=`, `in %var` and
//!   `where(...)` support
//! - First-match-wins rule dispatch with default and delegated fallbacks
//! - Profile tagging and relationship linking primitives for transforms

pub mod bindings;
pub mod context;
pub mod document;
pub mod error;
pub mod expression;
pub mod pipeline;
pub mod profile;
pub mod relationship;
pub mod rule_set;

// Re-export commonly used types
pub use bindings::Bindings;
pub use context::Context;
pub use document::{CodeableConcept, Coding, Document, Relationship, ResourceKind};
pub use error::{BuildError, ExpressionError, TransformError};
pub use expression::{evaluate, Expression};
pub use pipeline::{chain_of, AggregatePipeline, Mapper, Pipeline};
pub use profile::apply_profile;
pub use relationship::{add_related, find, find_str};
pub use rule_set::{Filter, PredicateFn, Rule, RuleSet, TransformFn};

/// Relationship kind linking a panel observation to its members
pub const HAS_MEMBER: &str = "has-member";
