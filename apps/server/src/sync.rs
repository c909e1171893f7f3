//! Metadata synchronization: registry reference data into the document store.
//!
//! Each registry item becomes a concept document carrying a mapping whose
//! system is the target registry tag and whose code is the item's id. Source
//! vocabulary mappings are curated afterwards through the indexing endpoint;
//! synchronization never touches them because documents are overwritten whole
//! only under their registry id.

use crate::Result;
use bridge_registry::{MetadataKind, RegistryClient};
use bridge_store::{Collection, DocumentStore};
use bridge_translate::TARGET_SYSTEM;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;

const KINDS: [MetadataKind; 5] = [
    MetadataKind::Attributes,
    MetadataKind::DataElements,
    MetadataKind::EntityTypes,
    MetadataKind::Programs,
    MetadataKind::Stages,
];

/// Entity-type names (lowercased) treated as the person type.
const PERSON_TYPE_NAMES: [&str; 2] = ["person", "case"];

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub synchronized: BTreeMap<String, usize>,
}

pub struct SyncService {
    registry: Arc<dyn RegistryClient>,
    store: Arc<dyn DocumentStore>,
}

impl SyncService {
    pub fn new(registry: Arc<dyn RegistryClient>, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    /// Fetch every reference-data kind from the registry and index it.
    pub async fn synchronize(&self) -> Result<SyncReport> {
        let mut synchronized = BTreeMap::new();

        for kind in KINDS {
            let body = self.registry.metadata(kind).await?;
            let items = body
                .get(kind.list_key())
                .and_then(JsonValue::as_array)
                .cloned()
                .unwrap_or_default();

            let collection = collection_for(kind);
            let mut count = 0;
            for item in &items {
                let Some((id, document)) = concept_document(kind, item) else {
                    continue;
                };
                self.store.put(collection, &id, document).await?;
                count += 1;
            }

            tracing::info!(%collection, count, "synchronized reference data");
            synchronized.insert(collection.to_string(), count);
        }

        Ok(SyncReport { synchronized })
    }
}

fn collection_for(kind: MetadataKind) -> Collection {
    match kind {
        MetadataKind::Attributes => Collection::Attributes,
        MetadataKind::DataElements => Collection::DataElements,
        MetadataKind::EntityTypes => Collection::EntityTypes,
        MetadataKind::Programs => Collection::Programs,
        MetadataKind::Stages => Collection::Stages,
    }
}

/// Build the concept document for one registry metadata item.
///
/// Items without an id are skipped.
fn concept_document(kind: MetadataKind, item: &JsonValue) -> Option<(String, JsonValue)> {
    let id = item.get("id")?.as_str()?.to_string();
    let name = item.get("name").and_then(JsonValue::as_str);

    let mut document = json!({
        "mappings": [{"system": TARGET_SYSTEM, "code": id}]
    });
    if let Some(name) = name {
        document["name"] = json!(name);
    }

    match kind {
        MetadataKind::Attributes => {
            if let Some(value_type) = item.get("valueType") {
                document["valueType"] = value_type.clone();
            }
            if item.get("unique").and_then(JsonValue::as_bool) == Some(true) {
                document["identifier"] = json!(true);
            }
        }
        MetadataKind::DataElements => {
            if let Some(value_type) = item.get("valueType") {
                document["valueType"] = value_type.clone();
            }
        }
        MetadataKind::EntityTypes => {
            let is_person = name
                .map(|n| PERSON_TYPE_NAMES.contains(&n.to_lowercase().as_str()))
                .unwrap_or(false);
            if is_person {
                document["type"] = json!("Person");
            }
        }
        MetadataKind::Stages => {
            document["repeatable"] = json!(
                item.get("repeatable").and_then(JsonValue::as_bool) == Some(true)
            );
            if let Some(program) = item.get("program") {
                document["program"] = program.clone();
            }
        }
        MetadataKind::Programs => {}
    }

    Some((id, document))
}
