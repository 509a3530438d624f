use oncomap::config::{Config, ConfigError};
use oncomap::mappers::cerner::TUMOR_MARKER_TEST;
use oncomap::transform::{chain_of, Context, Document, Mapper};
use oncomap::{MapperRegistry, NoConditionLinker};
use serde_json::json;
use std::sync::Arc;

fn build_registry(toml: &str) -> Result<MapperRegistry, ConfigError> {
    let config = Config::from_toml_str(toml)?;
    MapperRegistry::build(&config, Arc::new(NoConditionLinker))
}

#[test]
fn test_chains_follow_configured_delegates() {
    let registry = build_registry(
        r#"
        [mappers.base]
        rule_set = "synthea"

        [mappers.site]
        rule_set = "cerner"
        delegate = "base"

        [mappers.regional]
        rule_set = "cerner"
        delegate = "site"
        "#,
    )
    .unwrap();

    assert_eq!(registry.len(), 3);
    let regional = registry.get("regional").unwrap();
    assert_eq!(chain_of(regional.as_ref()), vec!["regional", "site", "base"]);
}

#[test]
fn test_aggregate_without_delegate_falls_back_to_synthea() {
    let registry = build_registry(
        r#"
        [mappers.cerner]
        rule_set = "cerner"
        "#,
    )
    .unwrap();

    let cerner = registry.get("cerner").unwrap();
    assert_eq!(chain_of(cerner.as_ref()), vec!["cerner", "synthea"]);
    assert!(registry.get("synthea").is_none());
}

#[test]
fn test_two_mapper_cycle() {
    let err = build_registry(
        r#"
        [mappers.a]
        rule_set = "cerner"
        delegate = "b"

        [mappers.b]
        rule_set = "cerner"
        delegate = "a"
        "#,
    )
    .err()
    .unwrap();

    match err {
        ConfigError::DelegationCycle(cycle) => assert_eq!(cycle, vec!["a", "b", "a"]),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_delegate() {
    let err = build_registry(
        r#"
        [mappers.cerner]
        rule_set = "cerner"
        delegate = "nowhere"
        "#,
    )
    .err()
    .unwrap();

    match err {
        ConfigError::UnknownDelegate { mapper, delegate } => {
            assert_eq!(mapper, "cerner");
            assert_eq!(delegate, "nowhere");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_rule_set() {
    let err = build_registry(
        r#"
        [mappers.epic]
        rule_set = "epic"
        "#,
    )
    .err()
    .unwrap();

    assert!(matches!(err, ConfigError::UnknownRuleSet { .. }));
    assert_eq!(err.to_string(), "Mapper 'epic' uses unknown rule set 'epic'");
}

#[test]
fn test_synthea_cannot_delegate() {
    let err = build_registry(
        r#"
        [mappers.base]
        rule_set = "synthea"

        [mappers.other]
        rule_set = "synthea"
        delegate = "base"
        "#,
    )
    .err()
    .unwrap();

    assert!(matches!(err, ConfigError::DelegateNotSupported { .. }));
}

#[test]
fn test_registered_mapper_uses_variable_overrides() {
    let registry = build_registry(
        r#"
        [mappers.site]
        rule_set = "cerner"

        [mappers.site.variables]
        her2Codes = ["HER2 IHC RESULT"]
        "#,
    )
    .unwrap();

    let site = registry.get("site").unwrap();
    let mut doc =
        Document::new("Observation").with_field("code", json!({ "text": "HER2 IHC RESULT" }));
    site.execute(&mut doc, &Context::empty()).unwrap();

    assert_eq!(doc.profiles, Some(vec![TUMOR_MARKER_TEST.to_string()]));
}
