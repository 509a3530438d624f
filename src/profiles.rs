//! Default profile per resource kind
//!
//! Kinds without an entry are intentionally unmapped: the default transform
//! applies no profile to them.

use once_cell::sync::Lazy;
use oncomap_transform::ResourceKind;
use std::collections::HashMap;

/// Versioned, read-only mapping from resource kind to its default profile
#[derive(Debug, Clone)]
pub struct ProfileTable {
    version: &'static str,
    entries: HashMap<ResourceKind, &'static str>,
}

impl ProfileTable {
    pub fn new(
        version: &'static str,
        entries: impl IntoIterator<Item = (ResourceKind, &'static str)>,
    ) -> Self {
        Self {
            version,
            entries: entries.into_iter().collect(),
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Profile registered for `kind`, or `None` when the kind is unmapped
    pub fn get(&self, kind: &ResourceKind) -> Option<&'static str> {
        self.entries.get(kind).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub static DEFAULT_PROFILES: Lazy<ProfileTable> = Lazy::new(|| {
    ProfileTable::new(
        "0.5",
        [
            (
                ResourceKind::Patient,
                "http://hl7.org/fhir/us/fhirURL/StructureDefinition/shr-entity-Patient",
            ),
            (
                ResourceKind::Observation,
                "http://hl7.org/fhir/us/fhirURL/StructureDefinition/shr-base-Observation",
            ),
            (
                ResourceKind::Encounter,
                "http://hl7.org/fhir/us/fhirURL/StructureDefinition/shr-encounter-Encounter",
            ),
            (
                ResourceKind::Condition,
                "http://example.com/shr-base-ConditionPresentAssertion",
            ),
            (
                ResourceKind::Procedure,
                "http://example.com/shr-procedure-ProcedurePerformed",
            ),
            (ResourceKind::Organization, "shr-entity-Organization"),
            (ResourceKind::Practitioner, "shr-entity-Practitioner"),
            // MedicationRequest, DiagnosticReport, Claim, ExplanationOfBenefit,
            // CarePlan, Goal and Immunization have no profile yet
        ],
    )
});

pub fn default_profile(kind: &ResourceKind) -> Option<&'static str> {
    DEFAULT_PROFILES.get(kind)
}
