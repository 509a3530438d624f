//! Document model for clinical resources
//!
//! A [`Document`] is one node of a clinical-record graph. The resource kind is
//! a closed discriminant; the shared base shape (applied profiles, recorded
//! relationships) is typed, and everything kind-specific stays in a JSON
//! object so filter expressions can navigate it.

use crate::error::TransformError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Resource type discriminant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceKind {
    Patient,
    Observation,
    Encounter,
    Condition,
    Procedure,
    Organization,
    Practitioner,
    MedicationRequest,
    DiagnosticReport,
    Claim,
    ExplanationOfBenefit,
    CarePlan,
    Goal,
    Immunization,
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Observation => "Observation",
            ResourceKind::Encounter => "Encounter",
            ResourceKind::Condition => "Condition",
            ResourceKind::Procedure => "Procedure",
            ResourceKind::Organization => "Organization",
            ResourceKind::Practitioner => "Practitioner",
            ResourceKind::MedicationRequest => "MedicationRequest",
            ResourceKind::DiagnosticReport => "DiagnosticReport",
            ResourceKind::Claim => "Claim",
            ResourceKind::ExplanationOfBenefit => "ExplanationOfBenefit",
            ResourceKind::CarePlan => "CarePlan",
            ResourceKind::Goal => "Goal",
            ResourceKind::Immunization => "Immunization",
            ResourceKind::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        match name {
            "Patient" => ResourceKind::Patient,
            "Observation" => ResourceKind::Observation,
            "Encounter" => ResourceKind::Encounter,
            "Condition" => ResourceKind::Condition,
            "Procedure" => ResourceKind::Procedure,
            "Organization" => ResourceKind::Organization,
            "Practitioner" => ResourceKind::Practitioner,
            "MedicationRequest" => ResourceKind::MedicationRequest,
            "DiagnosticReport" => ResourceKind::DiagnosticReport,
            "Claim" => ResourceKind::Claim,
            "ExplanationOfBenefit" => ResourceKind::ExplanationOfBenefit,
            "CarePlan" => ResourceKind::CarePlan,
            "Goal" => ResourceKind::Goal,
            "Immunization" => ResourceKind::Immunization,
            other => ResourceKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        ResourceKind::from(name.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single code from a code system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(
        code: impl Into<String>,
        system: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            system: Some(system.into()),
            display: Some(display.into()),
        }
    }
}

/// Coded value container: a list of codings plus optional free text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Typed link from one document to another within the same context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_kind: String,
    pub target_ref: String,
}

/// One clinical resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "resourceType")]
    pub kind: ResourceKind,

    /// Applied profile identifiers, most specific first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Vec<Relationship>>,

    /// Kind-specific content (`id`, `code`, `valueCodeableConcept`, ...)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(kind: impl Into<ResourceKind>) -> Self {
        Self {
            kind: kind.into(),
            profiles: None,
            related: None,
            fields: Map::new(),
        }
    }

    /// Parse a document from its JSON form (`resourceType` is required)
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_field("id", Value::String(id.into()))
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Top-level member `name` as JSON, including the typed `profiles` and
    /// `related` lists (the latter in their camelCase wire form).
    pub fn member(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "profiles" => self
                .profiles
                .as_ref()
                .map(|profiles| Cow::Owned(Value::from(profiles.clone()))),
            "related" => self
                .related
                .as_ref()
                .and_then(|related| serde_json::to_value(related).ok())
                .map(Cow::Owned),
            _ => self.fields.get(name).map(Cow::Borrowed),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// Stable `Kind/id` reference, if the document has an id
    pub fn reference(&self) -> Option<String> {
        self.id()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/{}", self.kind, id))
    }

    pub fn code(&self) -> Option<CodeableConcept> {
        self.fields
            .get("code")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn code_text(&self) -> Option<&str> {
        self.fields
            .get("code")
            .and_then(|code| code.get("text"))
            .and_then(Value::as_str)
    }

    /// Replace `code.coding`, keeping any other `code` content such as its text
    pub fn set_code_coding(&mut self, coding: Vec<Coding>) -> Result<(), TransformError> {
        let coding = serde_json::to_value(coding)?;
        set_child(&mut self.fields, "code", "coding", coding);
        Ok(())
    }

    /// Free-text value awaiting conversion to a coded value
    pub fn value_text(&self) -> Option<&str> {
        self.fields
            .get("valueCodeableConcept")
            .and_then(|value| value.get("text"))
            .and_then(Value::as_str)
    }

    /// Replace `valueCodeableConcept.coding` with a single coding carrying the
    /// free text as both code and display.
    ///
    /// Fails without touching the document when no free text is present.
    pub fn value_text_to_coding(&mut self) -> Result<(), TransformError> {
        let text = self
            .value_text()
            .ok_or_else(|| TransformError::missing_field(&self.kind, "valueCodeableConcept.text"))?
            .to_string();

        let coding = serde_json::to_value(vec![Coding {
            code: text.clone(),
            system: None,
            display: Some(text),
        }])?;
        set_child(&mut self.fields, "valueCodeableConcept", "coding", coding);
        Ok(())
    }

    pub fn extensions(&self) -> &[Value] {
        self.fields
            .get("extension")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn push_extension(&mut self, extension: Value) {
        let slot = self
            .fields
            .entry("extension")
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(extension),
            other => *other = Value::Array(vec![extension]),
        }
    }
}

/// Set `parent.child = value`, creating or replacing `parent` as an object
fn set_child(fields: &mut Map<String, Value>, parent: &str, child: &str, value: Value) {
    let slot = fields
        .entry(parent)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        map.insert(child.to_string(), value);
    }
}
