//! Synthea conventions to the base oncology profiles
//!
//! Every resource gets its kind's default profile unless a rule recognises a
//! cancer disorder or a radiation procedure.

use crate::profiles::default_profile;
use oncomap_transform::{apply_profile, BuildError, Bindings, Filter, Pipeline, RuleSet};

pub const NAME: &str = "synthea";

/// SNOMED codes Synthea uses for primary cancer disorders
pub const CANCER_DISORDER_CODES: &[&str] = &["93761005", "94260004"];

pub const CANCER_DISORDER_PRESENT: &str =
    "http://hl7.org/fhir/us/fhirURL/StructureDefinition/oncocore-CancerDisorderPresent";
pub const RADIATION_PROCEDURE_PERFORMED: &str =
    "http://hl7.org/fhir/us/fhirURL/StructureDefinition/oncocore-RadiationProcedurePerformed";

pub fn rule_set() -> RuleSet {
    RuleSet::new(NAME)
        .rule(
            Filter::expr(
                "Condition.code.coding.where($this.code = '93761005' or $this.code = '94260004')",
            ),
            |doc, _| {
                apply_profile(doc, Some(CANCER_DISORDER_PRESENT));
                Ok(())
            },
        )
        .rule(
            Filter::expr("Procedure.code.coding.where($this.code = '703423002')"),
            |doc, _| {
                apply_profile(doc, Some(RADIATION_PROCEDURE_PERFORMED));
                Ok(())
            },
        )
        .default_transform(|doc, _| {
            let profile = default_profile(&doc.kind);
            apply_profile(doc, profile);
            Ok(())
        })
}

pub fn build() -> Result<Pipeline, BuildError> {
    Pipeline::build(rule_set(), &Bindings::new())
}
