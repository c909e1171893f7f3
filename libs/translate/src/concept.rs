//! Concept records and their cross-system code mappings.

use serde::{Deserialize, Serialize};

/// Reserved source-system tag marking a mapping as the target registry code.
pub const TARGET_SYSTEM: &str = "DHIS2";

/// One stored equivalence between a source vocabulary code and a code in
/// some system (including the target registry itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMapping {
    pub system: String,
    pub code: String,
}

/// Reference to the program a stage concept belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A reference-data concept as stored in the document store.
///
/// One record per attribute, data element, entity type, program, or program
/// stage. A concept holds zero or one mapping per source system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Concept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<CodeMapping>,

    #[serde(rename = "valueType", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// Attributes only: whether values of this attribute identify a subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,

    /// Attribute field tag ("birthDate", "extension", ...) or the entity
    /// kind tag ("Person") assigned at synchronization time.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Stages only: whether the stage may occur more than once per subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,

    /// Stages only: the owning program.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramRef>,
}

impl Concept {
    /// The target registry code, taken from the mapping whose system equals
    /// the reserved target tag.
    pub fn target_code(&self) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.system == TARGET_SYSTEM)
            .map(|m| m.code.as_str())
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier.unwrap_or(false)
    }

    pub fn is_extension(&self) -> bool {
        self.kind.as_deref() == Some("extension")
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable.unwrap_or(false)
    }
}

/// Resolved program stage: everything the encounter translator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInfo {
    pub stage: String,
    pub program: String,
    pub repeatable: bool,
}

/// Resolved data element: target code plus its declared value type.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElementInfo {
    pub code: String,
    pub value_type: Option<String>,
}
