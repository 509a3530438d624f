//! Cerner staging and tumour-marker conventions
//!
//! Cerner exports AJCC staging and receptor-status observations as free text.
//! These rules attach the LOINC code and oncology profile for each; anything
//! else falls through to the delegate (the Synthea mapper by default).

use crate::condition::ConditionLinker;
use crate::mappers::synthea;
use oncomap_transform::{
    add_related, apply_profile, find, AggregatePipeline, Bindings, BuildError, Coding, Expression,
    Filter, Mapper, RuleSet, HAS_MEMBER,
};
use std::sync::Arc;

pub const NAME: &str = "cerner";

pub const LOINC: &str = "http://loinc.org";

pub const TUMOR_MARKER_TEST: &str =
    "http://hl7.org/fhir/us/fhirURL/StructureDefinition/onco-core-TumorMarkerTest";

struct TumorMarker {
    var: &'static str,
    code: &'static str,
    display: &'static str,
}

const TUMOR_MARKERS: [TumorMarker; 3] = [
    TumorMarker {
        var: "erCodes",
        code: "16112-5",
        display: "Estrogen receptor [Interpretation] in Tissue",
    },
    TumorMarker {
        var: "prCodes",
        code: "16113-3",
        display: "Progesterone receptor [Interpretation] in Tissue",
    },
    TumorMarker {
        var: "her2Codes",
        code: "48676-1",
        display: "HER2 [Interpretation] in Tissue",
    },
];

/// A TNM observation whose free-text value becomes a coded value
struct Staging {
    var: &'static str,
    code: &'static str,
    display: &'static str,
    profile: &'static str,
    /// T, N and M variables whose observations become panel members
    members: &'static [&'static str],
}

const STAGE_GROUPS: [Staging; 2] = [
    Staging {
        var: "pStageCodes",
        code: "21902-2",
        display: "Stage group.pathology",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMPathologicStageGroup",
        members: &["pTCodes", "pNCodes", "pMCodes"],
    },
    Staging {
        var: "cStageCodes",
        code: "21908-9",
        display: "Stage group.clinical",
        profile: "http://hl7.org/fhir/us/fhirURL/StructureDefinition/onco-core-TNMClinicalStageGroup",
        members: &["cTCodes", "cNCodes", "cMCodes"],
    },
];

const CATEGORIES: [Staging; 6] = [
    Staging {
        var: "pMCodes",
        code: "21901-4",
        display: "Distant metastases.pathology",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMPathologicDistantMetastasesCategory",
        members: &[],
    },
    Staging {
        var: "pNCodes",
        code: "21900-6",
        display: "Regional lymph nodes.pathologic",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMPathologicRegionalNodesCategory",
        members: &[],
    },
    Staging {
        var: "pTCodes",
        code: "21899-0",
        display: "Primary tumor.pathology",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMPathologicPrimaryTumorCategory",
        members: &[],
    },
    Staging {
        var: "cMCodes",
        code: "21907-1",
        display: "Distant metastases.clinical",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMClinicalDistantMetastasesCategory",
        members: &[],
    },
    Staging {
        var: "cNCodes",
        code: "21906-3",
        display: "Regional lymph nodes.clinical",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMClinicalRegionalNodesCategory",
        members: &[],
    },
    Staging {
        var: "cTCodes",
        code: "21905-5",
        display: "Primary tumor.clinical",
        profile: "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMClinicalPrimaryTumorCategory",
        members: &[],
    },
];

/// Built-in Cerner code-text variables
pub fn bindings() -> Bindings {
    Bindings::new()
        .with("pStageCodes", &["AJCCV8 MAG-PRO P Stage", "AJCCV8 BRE-INV P Stage"])
        .with("cStageCodes", &["AJCCV8 MAG-PRO C Stage", "AJCCV8 BRE-INV C Stage"])
        .with("pTCodes", &["AJCCV8 MAG-PRO T Category P", "AJCCV8 BRE-INV T Category P"])
        .with("cTCodes", &["AJCCV8 MAG-PRO T Category C", "AJCCV8 BRE-INV T Category C"])
        .with("pMCodes", &["AJCCV8 MAG-PRO M Category P", "AJCCV8 BRE-INV M Category P"])
        .with("cMCodes", &["AJCCV8 MAG-PRO M Category C", "AJCCV8 BRE-INV M Category C"])
        .with("pNCodes", &["AJCCV8 MAG-PRO N Category P", "AJCCV8 BRE-INV N Category P"])
        .with("cNCodes", &["AJCCV8 MAG-PRO N Category C", "AJCCV8 BRE-INV N Category C"])
        .with("erCodes", &["AJCCV8 BRE-INV ER Status"])
        .with("prCodes", &["AJCCV8 BRE-INV PR Status"])
        .with("her2Codes", &["AJCCV8 BRE-INV HER2 Status"])
}

fn code_text_in(var: &str) -> String {
    format!("Observation.code.text in %{}", var)
}

/// Cerner rules, with sibling lookups resolved against `overrides` merged
/// over the built-in variables.
pub fn rule_set(
    overrides: &Bindings,
    linker: Arc<dyn ConditionLinker>,
) -> Result<RuleSet, BuildError> {
    let resolved = bindings().merged(overrides);
    let mut rule_set = RuleSet::new(NAME).bindings(bindings());

    for marker in &TUMOR_MARKERS {
        let (code, display) = (marker.code, marker.display);
        rule_set = rule_set.rule(Filter::expr(code_text_in(marker.var)), move |doc, _| {
            doc.set_code_coding(vec![Coding::new(code, LOINC, display)])?;
            apply_profile(doc, Some(TUMOR_MARKER_TEST));
            Ok(())
        });
    }

    for group in &STAGE_GROUPS {
        let lookups = group
            .members
            .iter()
            .map(|var| Expression::compile(&code_text_in(var), &resolved))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| BuildError::Lookup {
                rule_set: NAME.to_string(),
                source,
            })?;
        let linker = linker.clone();
        let (code, display, profile) = (group.code, group.display, group.profile);

        rule_set = rule_set.rule(Filter::expr(code_text_in(group.var)), move |doc, ctx| {
            let members: Vec<_> = lookups.iter().flat_map(|lookup| find(ctx, lookup)).collect();

            doc.value_text_to_coding()?;
            doc.set_code_coding(vec![Coding::new(code, LOINC, display)])?;
            add_related(doc, HAS_MEMBER, members);
            linker.attach_condition_reference(doc, ctx);
            apply_profile(doc, Some(profile));
            Ok(())
        });
    }

    for category in &CATEGORIES {
        let linker = linker.clone();
        let (code, display, profile) = (category.code, category.display, category.profile);

        rule_set = rule_set.rule(Filter::expr(code_text_in(category.var)), move |doc, ctx| {
            doc.value_text_to_coding()?;
            doc.set_code_coding(vec![Coding::new(code, LOINC, display)])?;
            linker.attach_condition_reference(doc, ctx);
            apply_profile(doc, Some(profile));
            Ok(())
        });
    }

    Ok(rule_set)
}

/// Cerner over the Synthea mapper
pub fn build(
    overrides: &Bindings,
    linker: Arc<dyn ConditionLinker>,
) -> Result<AggregatePipeline, BuildError> {
    let delegate: Arc<dyn Mapper> = Arc::new(synthea::build()?);
    build_with_delegate(overrides, linker, delegate)
}

pub fn build_with_delegate(
    overrides: &Bindings,
    linker: Arc<dyn ConditionLinker>,
    delegate: Arc<dyn Mapper>,
) -> Result<AggregatePipeline, BuildError> {
    AggregatePipeline::build(rule_set(overrides, linker)?, overrides, delegate)
}
