//! In-memory implementation, used by tests and local development.

use crate::{Collection, DocumentStore, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, HashMap<String, JsonValue>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub async fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection).await == 0
    }
}

/// Walk a dotted path, descending into arrays, and collect every string leaf.
fn string_leaves<'a>(value: &'a JsonValue, path: &str, out: &mut Vec<&'a str>) {
    match path.split_once('.') {
        None => match value.get(path) {
            Some(JsonValue::String(s)) => out.push(s),
            Some(JsonValue::Array(items)) => {
                for item in items {
                    if let Some(s) = item.as_str() {
                        out.push(s);
                    }
                }
            }
            _ => {}
        },
        Some((head, rest)) => match value.get(head) {
            Some(JsonValue::Array(items)) => {
                for item in items {
                    string_leaves(item, rest, out);
                }
            }
            Some(nested) => string_leaves(nested, rest, out),
            None => {}
        },
    }
}

fn field_matches(document: &JsonValue, field: &str, value: &str) -> bool {
    let mut leaves = Vec::new();
    string_leaves(document, field, &mut leaves);
    leaves.iter().any(|leaf| *leaf == value)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, collection: Collection, id: &str, document: JsonValue) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<JsonValue>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| {
                docs.values()
                    .find(|doc| field_matches(doc, field, value))
                    .cloned()
            }))
    }

    async fn find_by_code_mapping(
        &self,
        collection: Collection,
        system: &str,
        code: &str,
    ) -> Result<Option<JsonValue>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(None);
        };

        // Both fields must match within the same mapping entry.
        Ok(docs
            .values()
            .find(|doc| {
                doc.get("mappings")
                    .and_then(JsonValue::as_array)
                    .is_some_and(|mappings| {
                        mappings.iter().any(|m| {
                            m.get("system").and_then(JsonValue::as_str) == Some(system)
                                && m.get("code").and_then(JsonValue::as_str) == Some(code)
                        })
                    })
            })
            .cloned())
    }

    async fn find_by_identifier_set(
        &self,
        collection: Collection,
        field: &str,
        values: &[String],
    ) -> Result<Vec<JsonValue>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| values.iter().any(|v| field_matches(doc, field, v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
