//! Cross-reference from a finding to its governing cancer condition

use oncomap_transform::{Context, Document, ResourceKind};
use serde_json::json;
use std::collections::HashSet;

pub const RELATED_CANCER_CONDITION_URL: &str =
    "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-RelatedCancerCondition-extension";

/// Attaches a reference to the governing condition found in the context.
///
/// Implementations must not touch `code` or `profiles`, and must leave the
/// document unchanged when no condition is found.
pub trait ConditionLinker: Send + Sync {
    fn attach_condition_reference(&self, document: &mut Document, context: &Context<'_>);
}

/// Linker for callers without a condition lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConditionLinker;

impl ConditionLinker for NoConditionLinker {
    fn attach_condition_reference(&self, _document: &mut Document, _context: &Context<'_>) {}
}

/// Links to the first Condition in context coded as a cancer disorder
#[derive(Debug, Clone)]
pub struct CancerConditionLinker {
    codes: HashSet<String>,
    extension_url: String,
}

impl CancerConditionLinker {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            extension_url: RELATED_CANCER_CONDITION_URL.to_string(),
        }
    }

    pub fn with_extension_url(mut self, url: impl Into<String>) -> Self {
        self.extension_url = url.into();
        self
    }

    fn is_cancer_condition(&self, document: &Document) -> bool {
        document.kind == ResourceKind::Condition
            && document.code().map_or(false, |code| {
                code.coding.iter().any(|coding| self.codes.contains(&coding.code))
            })
    }
}

impl Default for CancerConditionLinker {
    fn default() -> Self {
        Self::new(crate::mappers::synthea::CANCER_DISORDER_CODES.iter().copied())
    }
}

impl ConditionLinker for CancerConditionLinker {
    fn attach_condition_reference(&self, document: &mut Document, context: &Context<'_>) {
        let reference = context
            .iter()
            .filter(|doc| self.is_cancer_condition(doc))
            .find_map(Document::reference);

        match reference {
            Some(reference) => {
                tracing::debug!("Linking {} to cancer condition {}", document.kind, reference);
                document.push_extension(json!({
                    "url": self.extension_url,
                    "valueReference": { "reference": reference }
                }));
            }
            None => tracing::trace!("No cancer condition in context for {}", document.kind),
        }
    }
}
