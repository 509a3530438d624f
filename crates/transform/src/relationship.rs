use crate::bindings::Bindings;
use crate::context::Context;
use crate::document::{Document, Relationship};
use crate::error::ExpressionError;
use crate::expression::Expression;

/// Every document in `context` matching `filter`; empty when nothing does
pub fn find<'a>(context: &Context<'a>, filter: &Expression) -> Vec<&'a Document> {
    context.iter().filter(|doc| filter.matches(doc)).collect()
}

/// Compile `filter` against `bindings` and run [`find`]
pub fn find_str<'a>(
    context: &Context<'a>,
    filter: &str,
    bindings: &Bindings,
) -> Result<Vec<&'a Document>, ExpressionError> {
    let filter = Expression::compile(filter, bindings)?;
    Ok(find(context, &filter))
}

/// Record a `kind` relationship from `document` to each target.
///
/// Accepts a single document (`Some(&doc)`, `[&doc]`), a list, or an empty
/// lookup result. A target without an id has no stable reference and is
/// skipped, so no dangling entry is ever written.
pub fn add_related<'t, I>(document: &mut Document, kind: &str, targets: I)
where
    I: IntoIterator<Item = &'t Document>,
{
    let mut entries = Vec::new();
    for target in targets {
        match target.reference() {
            Some(target_ref) => entries.push(Relationship {
                relationship_kind: kind.to_string(),
                target_ref,
            }),
            None => tracing::warn!(
                "Skipping {} relationship to {} without an id",
                kind,
                target.kind
            ),
        }
    }

    if entries.is_empty() {
        return;
    }

    tracing::debug!("Linking {} {} relationship(s) on {}", entries.len(), kind, document.kind);
    document
        .related
        .get_or_insert_with(Vec::new)
        .extend(entries);
}
