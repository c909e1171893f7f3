//! Bundle document and the type-dispatch enum.

use crate::{Encounter, EpisodeOfCare, Observation, Patient};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// One bundle entry. The resource is kept as raw JSON so an unrecognized
/// type can be reported per entry instead of failing the whole bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,
}

/// A clinical document tagged with its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum ClinicalDocument {
    Patient(Patient),
    EpisodeOfCare(EpisodeOfCare),
    Encounter(Encounter),
    Observation(Observation),
    Bundle(Bundle),
}

impl ClinicalDocument {
    /// The declared type of a raw document, if any.
    pub fn declared_type(value: &JsonValue) -> Option<&str> {
        value.get("resourceType")?.as_str()
    }

    pub fn from_value(value: JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Patient(_) => "Patient",
            Self::EpisodeOfCare(_) => "EpisodeOfCare",
            Self::Encounter(_) => "Encounter",
            Self::Observation(_) => "Observation",
            Self::Bundle(_) => "Bundle",
        }
    }
}
