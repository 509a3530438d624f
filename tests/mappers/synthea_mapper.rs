use oncomap::mappers::synthea::{self, CANCER_DISORDER_PRESENT, RADIATION_PROCEDURE_PERFORMED};
use oncomap::profiles::DEFAULT_PROFILES;
use oncomap::transform::{Context, Document, Mapper, ResourceKind};
use serde_json::json;

fn convert(mut doc: Document) -> Document {
    let pipeline = synthea::build().expect("synthea rule set should build");
    pipeline
        .execute(&mut doc, &Context::empty())
        .expect("conversion should succeed");
    doc
}

#[test]
fn test_unmatched_kind_gets_its_default_profile() {
    let doc = convert(
        Document::new("Observation")
            .with_id("obs-1")
            .with_field("code", json!({ "coding": [{ "code": "8302-2" }] })),
    );

    let expected = DEFAULT_PROFILES.get(&ResourceKind::Observation).unwrap();
    assert_eq!(doc.profiles, Some(vec![expected.to_string()]));
}

#[test]
fn test_non_cancer_condition_falls_back_to_default() {
    let doc = convert(
        Document::new("Condition")
            .with_field("code", json!({ "coding": [{ "code": "38341003" }] })),
    );

    let profiles = doc.profiles.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0], DEFAULT_PROFILES.get(&ResourceKind::Condition).unwrap());
    assert!(!profiles.contains(&CANCER_DISORDER_PRESENT.to_string()));
}

#[test]
fn test_specific_rule_skips_default_profile() {
    let doc = convert(Document::new("Procedure").with_field(
        "code",
        json!({ "coding": [{ "code": "428024001" }, { "code": "703423002" }] }),
    ));

    assert_eq!(doc.profiles, Some(vec![RADIATION_PROCEDURE_PERFORMED.to_string()]));
}

#[test]
fn test_kind_without_default_profile_is_untouched() {
    let original = Document::new("Claim")
        .with_id("claim-1")
        .with_field("status", json!("active"));
    let doc = convert(original.clone());

    assert!(doc.profiles.is_none());
    assert_eq!(doc, original);
}

#[test]
fn test_existing_profiles_are_kept_after_the_new_one() {
    let mut original = Document::new("Patient").with_id("p1");
    original.profiles = Some(vec!["http://example.org/local-patient".to_string()]);

    let doc = convert(original);

    assert_eq!(
        doc.profiles,
        Some(vec![
            DEFAULT_PROFILES.get(&ResourceKind::Patient).unwrap().to_string(),
            "http://example.org/local-patient".to_string(),
        ])
    );
}

#[test]
fn test_documents_parsed_from_json() {
    let doc = Document::from_value(json!({
        "resourceType": "Condition",
        "id": "c1",
        "code": { "coding": [{ "system": "http://snomed.info/sct", "code": "94260004" }] }
    }))
    .unwrap();

    let doc = convert(doc);
    assert_eq!(doc.profiles, Some(vec![CANCER_DISORDER_PRESENT.to_string()]));
    assert_eq!(doc.reference().as_deref(), Some("Condition/c1"));
}
