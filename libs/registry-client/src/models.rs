//! Wire types for the registry's tracker API.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One attribute value on a tracked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub attribute: String,
    pub value: String,
}

/// A subject as submitted to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntity {
    pub tracked_entity_instance: String,
    pub tracked_entity_type: String,
    pub org_unit: String,
    pub attributes: Vec<Attribute>,
}

/// A care-program enrollment as submitted to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub enrollment: String,
    pub tracked_entity_instance: String,
    pub program: String,
    pub org_unit: String,
    pub enrollment_date: String,
    pub incident_date: String,
}

/// One captured data value on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: String,
    pub value: String,
}

/// A program-stage event as submitted to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event: String,
    pub program: String,
    pub program_stage: String,
    pub tracked_entity_instance: String,
    pub org_unit: String,
    pub enrollment: String,
    pub event_date: String,
    #[serde(default)]
    pub data_values: Vec<DataValue>,
}

/// Status and body of a registry write.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryResponse {
    pub status: u16,
    pub body: JsonValue,
}

impl RegistryResponse {
    /// The registry answers 409 when the entity already exists; for subject
    /// creation that is a successful idempotent outcome.
    pub fn is_success_or_conflict(&self) -> bool {
        self.status == 200 || self.status == 201 || self.status == 409
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Reference-data kinds fetched during metadata synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Attributes,
    DataElements,
    EntityTypes,
    Programs,
    Stages,
}

impl MetadataKind {
    pub fn path(&self) -> &'static str {
        match self {
            MetadataKind::Attributes => "trackedEntityAttributes",
            MetadataKind::DataElements => "dataElements",
            MetadataKind::EntityTypes => "trackedEntityTypes",
            MetadataKind::Programs => "programs",
            MetadataKind::Stages => "programStages",
        }
    }

    /// Field selection requested from the registry for this kind.
    pub fn fields(&self) -> &'static str {
        match self {
            MetadataKind::Attributes => "id,name,shortName,description,valueType,unique",
            MetadataKind::DataElements => "id,name,shortName,description,valueType",
            MetadataKind::EntityTypes => "id,name,shortName,description",
            MetadataKind::Programs => "id,name,shortName,description",
            MetadataKind::Stages => "id,name,description,repeatable,program[id,name]",
        }
    }

    /// Extra server-side filter for this kind. Data elements are restricted
    /// to the tracker domain; aggregate elements have no tracker mapping.
    pub fn filter(&self) -> Option<&'static str> {
        match self {
            MetadataKind::DataElements => Some("domainType:eq:TRACKER"),
            _ => None,
        }
    }

    /// Key of the item list in the registry's metadata response.
    pub fn list_key(&self) -> &'static str {
        self.path()
    }
}
