//! Document-store collaborator.
//!
//! The translation engine keeps two kinds of documents here: Concept records
//! carrying cross-system code mappings, and the mirrored subject state used
//! for deduplication. The store itself is a dumb search index; all business
//! meaning lives in `bridge-translate`.

mod error;
mod http;
mod memory;

pub use error::{Result, StoreError};
pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// The closed set of collections the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Tracked-entity attribute concepts (identifiers, demographic fields).
    Attributes,
    /// Data-element concepts referenced by observations.
    DataElements,
    /// Tracked-entity type concepts.
    EntityTypes,
    /// Care-program concepts.
    Programs,
    /// Program-stage concepts.
    Stages,
    /// Organisation-unit concepts.
    OrgUnits,
    /// Mirrored subject records.
    Subjects,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Attributes => "attributes",
            Collection::DataElements => "concepts",
            Collection::EntityTypes => "entities",
            Collection::Programs => "programs",
            Collection::Stages => "stages",
            Collection::OrgUnits => "organisations",
            Collection::Subjects => "patients",
        }
    }
}

impl std::str::FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "attributes" => Ok(Collection::Attributes),
            "concepts" => Ok(Collection::DataElements),
            "entities" => Ok(Collection::EntityTypes),
            "programs" => Ok(Collection::Programs),
            "stages" => Ok(Collection::Stages),
            "organisations" => Ok(Collection::OrgUnits),
            "patients" => Ok(Collection::Subjects),
            other => Err(StoreError::UnknownCollection(other.to_string())),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract interface over the document store.
///
/// Lookups that find nothing return `Ok(None)` / an empty list; only
/// transport and protocol failures are errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store (or overwrite) a document under an explicit id.
    async fn put(&self, collection: Collection, id: &str, document: JsonValue) -> Result<()>;

    /// Fetch a document by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>>;

    /// Find the first document whose field matches a value. Dotted paths
    /// descend into nested objects and arrays (`mappings.system`).
    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<JsonValue>>;

    /// Find the first document whose mapping list contains the given
    /// (source system, source code) pair.
    async fn find_by_code_mapping(
        &self,
        collection: Collection,
        system: &str,
        code: &str,
    ) -> Result<Option<JsonValue>>;

    /// Find all documents whose array field intersects the given values.
    async fn find_by_identifier_set(
        &self,
        collection: Collection,
        field: &str,
        values: &[String],
    ) -> Result<Vec<JsonValue>>;
}
