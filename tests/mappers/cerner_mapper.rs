use oncomap::condition::{CancerConditionLinker, NoConditionLinker, RELATED_CANCER_CONDITION_URL};
use oncomap::mappers::cerner::{self, LOINC, TUMOR_MARKER_TEST};
use oncomap::transform::{
    apply_profile, AggregatePipeline, Bindings, Coding, Context, Document, Mapper, RuleSet,
    TransformError, HAS_MEMBER,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const P_STAGE_PROFILE: &str =
    "http://hl7.org/fhir/us/shr/StructureDefinition/onco-core-TNMPathologicStageGroup";

fn staging(id: &str, code_text: &str, value_text: &str) -> Document {
    Document::new("Observation")
        .with_id(id)
        .with_field("code", json!({ "text": code_text }))
        .with_field("valueCodeableConcept", json!({ "text": value_text }))
}

fn cancer_condition(id: &str) -> Document {
    Document::new("Condition")
        .with_id(id)
        .with_field("code", json!({ "coding": [{ "code": "93761005" }] }))
}

/// Counts every document handed to it
struct CountingMapper {
    calls: AtomicUsize,
}

impl Mapper for CountingMapper {
    fn name(&self) -> &str {
        "counting"
    }

    fn execute(
        &self,
        _document: &mut Document,
        _context: &Context<'_>,
    ) -> Result<(), TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_er_status_marker() {
    let pipeline = cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap();
    let mut doc = Document::new("Observation")
        .with_field("code", json!({ "text": "AJCCV8 BRE-INV ER Status" }));

    pipeline.execute(&mut doc, &Context::empty()).unwrap();

    assert_eq!(
        doc.code().unwrap().coding,
        vec![Coding::new("16112-5", LOINC, "Estrogen receptor [Interpretation] in Tissue")]
    );
    assert_eq!(doc.profiles.unwrap()[0], TUMOR_MARKER_TEST);
    assert!(doc.related.is_none());
}

#[test]
fn test_pathologic_stage_links_its_categories() {
    let pipeline = cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap();

    let snapshot = vec![
        staging("t", "AJCCV8 BRE-INV T Category P", "pT2"),
        staging("n", "AJCCV8 BRE-INV N Category P", "pN1"),
        staging("m", "AJCCV8 BRE-INV M Category P", "pM0"),
        // clinical categories belong to the clinical stage group
        staging("ct", "AJCCV8 BRE-INV T Category C", "cT2"),
    ];
    let mut doc = staging("stage", "AJCCV8 BRE-INV P Stage", "IIB");

    pipeline.execute(&mut doc, &Context::new(&snapshot)).unwrap();

    assert_eq!(
        doc.code().unwrap().coding,
        vec![Coding::new("21902-2", LOINC, "Stage group.pathology")]
    );

    let related = doc.related.as_ref().unwrap();
    assert_eq!(related.len(), 3);
    assert!(related.iter().all(|r| r.relationship_kind == HAS_MEMBER));
    let targets: Vec<_> = related.iter().map(|r| r.target_ref.as_str()).collect();
    assert_eq!(targets, vec!["Observation/t", "Observation/n", "Observation/m"]);

    assert_eq!(
        doc.field("valueCodeableConcept"),
        Some(&json!({ "text": "IIB", "coding": [{ "code": "IIB", "display": "IIB" }] }))
    );
    assert_eq!(doc.profiles, Some(vec![P_STAGE_PROFILE.to_string()]));
}

#[test]
fn test_stage_group_links_cancer_condition() {
    let pipeline =
        cerner::build(&Bindings::new(), Arc::new(CancerConditionLinker::default())).unwrap();
    let snapshot = vec![cancer_condition("c1"), staging("t", "AJCCV8 MAG-PRO T Category P", "pT1")];
    let mut doc = staging("stage", "AJCCV8 MAG-PRO P Stage", "I");

    pipeline.execute(&mut doc, &Context::new(&snapshot)).unwrap();

    assert_eq!(
        doc.extensions(),
        [json!({
            "url": RELATED_CANCER_CONDITION_URL,
            "valueReference": { "reference": "Condition/c1" }
        })]
    );
    assert_eq!(doc.related.as_ref().unwrap().len(), 1);
}

#[test]
fn test_category_converts_value_and_links_condition() {
    let pipeline =
        cerner::build(&Bindings::new(), Arc::new(CancerConditionLinker::default())).unwrap();
    let snapshot = vec![cancer_condition("c1")];
    let mut doc = staging("m", "AJCCV8 BRE-INV M Category C", "cM0");

    pipeline.execute(&mut doc, &Context::new(&snapshot)).unwrap();

    assert_eq!(
        doc.code().unwrap().coding,
        vec![Coding::new("21907-1", LOINC, "Distant metastases.clinical")]
    );
    assert_eq!(doc.extensions().len(), 1);
    assert!(doc.related.is_none());
}

#[test]
fn test_matching_rule_bypasses_delegate() {
    let counter = Arc::new(CountingMapper {
        calls: AtomicUsize::new(0),
    });
    let pipeline =
        cerner::build_with_delegate(&Bindings::new(), Arc::new(NoConditionLinker), counter.clone())
            .unwrap();

    let mut marker = Document::new("Observation")
        .with_field("code", json!({ "text": "AJCCV8 BRE-INV PR Status" }));
    pipeline.execute(&mut marker, &Context::empty()).unwrap();

    assert_eq!(marker.profiles, Some(vec![TUMOR_MARKER_TEST.to_string()]));
    assert_eq!(counter.calls.load(Ordering::SeqCst), 0);

    let mut patient = Document::new("Patient").with_id("p1");
    pipeline.execute(&mut patient, &Context::empty()).unwrap();
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unrecognised_observation_uses_synthea_default() {
    let pipeline = cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap();
    let mut doc = Document::new("Observation").with_field("code", json!({ "text": "Body weight" }));

    pipeline.execute(&mut doc, &Context::empty()).unwrap();

    assert_eq!(
        doc.profiles,
        Some(vec![
            "http://hl7.org/fhir/us/fhirURL/StructureDefinition/shr-base-Observation".to_string()
        ])
    );
}

#[test]
fn test_unprofiled_kind_passes_through_the_chain() {
    let pipeline = cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap();
    let original = Document::new("Immunization").with_id("i1");
    let mut doc = original.clone();

    pipeline.execute(&mut doc, &Context::empty()).unwrap();

    assert_eq!(doc, original);
}

#[test]
fn test_variable_overrides_change_matching() {
    let overrides = Bindings::new().with("erCodes", &["ER STATUS (LOCAL)"]);
    let pipeline = cerner::build(&overrides, Arc::new(NoConditionLinker)).unwrap();

    let mut local = Document::new("Observation")
        .with_field("code", json!({ "text": "ER STATUS (LOCAL)" }));
    pipeline.execute(&mut local, &Context::empty()).unwrap();
    assert_eq!(local.profiles, Some(vec![TUMOR_MARKER_TEST.to_string()]));

    let mut builtin = Document::new("Observation")
        .with_field("code", json!({ "text": "AJCCV8 BRE-INV ER Status" }));
    pipeline.execute(&mut builtin, &Context::empty()).unwrap();
    assert_ne!(builtin.profiles, Some(vec![TUMOR_MARKER_TEST.to_string()]));
}

#[test]
fn test_custom_delegate_chain() {
    let local = AggregatePipeline::build(
        RuleSet::new("local"),
        &Bindings::new(),
        Arc::new(
            cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap(),
        ),
    )
    .unwrap();

    let mut doc = Document::new("Observation")
        .with_field("code", json!({ "text": "AJCCV8 BRE-INV HER2 Status" }));
    local.execute(&mut doc, &Context::empty()).unwrap();
    assert_eq!(doc.profiles, Some(vec![TUMOR_MARKER_TEST.to_string()]));

    let mut tagged = Document::new("Goal");
    apply_profile(&mut tagged, Some("http://example.org/goal"));
    local.execute(&mut tagged, &Context::empty()).unwrap();
    assert_eq!(tagged.profiles, Some(vec!["http://example.org/goal".to_string()]));
}

#[test]
fn test_clinical_stage_links_clinical_categories() {
    let pipeline = cerner::build(&Bindings::new(), Arc::new(NoConditionLinker)).unwrap();

    let snapshot = vec![
        staging("pt", "AJCCV8 BRE-INV T Category P", "pT2"),
        staging("ct", "AJCCV8 BRE-INV T Category C", "cT2"),
        staging("cn", "AJCCV8 MAG-PRO N Category C", "cN0"),
        staging("cm", "AJCCV8 BRE-INV M Category C", "cM0"),
    ];
    let mut doc = staging("stage", "AJCCV8 BRE-INV C Stage", "IIA");

    pipeline.execute(&mut doc, &Context::new(&snapshot)).unwrap();

    assert_eq!(
        doc.code().unwrap().coding,
        vec![Coding::new("21908-9", LOINC, "Stage group.clinical")]
    );
    let targets: Vec<_> = doc
        .related
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.target_ref.as_str())
        .collect();
    assert_eq!(targets, vec!["Observation/ct", "Observation/cn", "Observation/cm"]);
    assert_eq!(
        doc.profiles,
        Some(vec![
            "http://hl7.org/fhir/us/fhirURL/StructureDefinition/onco-core-TNMClinicalStageGroup"
                .to_string()
        ])
    );
}

#[test]
fn test_overridden_category_codes_drive_member_links() {
    let overrides = Bindings::new()
        .with("pTCodes", &["LOCAL pT"])
        .with("pNCodes", &["LOCAL pN"]);
    let pipeline = cerner::build(&overrides, Arc::new(NoConditionLinker)).unwrap();

    let snapshot = vec![
        staging("local-t", "LOCAL pT", "pT1"),
        staging("builtin-t", "AJCCV8 BRE-INV T Category P", "pT1"),
        staging("local-n", "LOCAL pN", "pN0"),
        staging("m", "AJCCV8 BRE-INV M Category P", "pM0"),
    ];
    let mut doc = staging("stage", "AJCCV8 BRE-INV P Stage", "I");

    pipeline.execute(&mut doc, &Context::new(&snapshot)).unwrap();

    let targets: Vec<_> = doc
        .related
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.target_ref.as_str())
        .collect();
    assert_eq!(
        targets,
        vec!["Observation/local-t", "Observation/local-n", "Observation/m"]
    );
}
