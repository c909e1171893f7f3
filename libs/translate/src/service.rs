//! The translation service: shared state and subject-mirror access.

use crate::{locks::SubjectLocks, mirror::SubjectMirror, resolver::MappingResolver, Error, Result};
use bridge_registry::RegistryClient;
use bridge_store::{Collection, DocumentStore};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Field on the mirror record holding the subject's identifier values.
pub(crate) const IDENTIFIERS_FIELD: &str = "identifiers";

pub struct TranslationService {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) registry: Arc<dyn RegistryClient>,
    pub(crate) resolver: MappingResolver,
    pub(crate) locks: SubjectLocks,
}

impl TranslationService {
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            resolver: MappingResolver::new(store.clone()),
            store,
            registry,
            locks: SubjectLocks::new(),
        }
    }

    /// Locate a mirrored subject by any of the given identifier values.
    pub(crate) async fn find_subject(&self, values: &[String]) -> Result<Option<SubjectMirror>> {
        let hits = self
            .store
            .find_by_identifier_set(Collection::Subjects, IDENTIFIERS_FIELD, values)
            .await?;
        let Some(document) = hits.into_iter().next() else {
            return Ok(None);
        };
        serde_json::from_value(document)
            .map(Some)
            .map_err(|e| Error::Internal(format!("malformed subject mirror: {e}")))
    }

    /// Persist a subject mirror, keyed by its registry identifier so repeat
    /// submissions overwrite rather than multiply.
    pub(crate) async fn put_subject(&self, mirror: &SubjectMirror) -> Result<()> {
        let document = serde_json::to_value(mirror)
            .map_err(|e| Error::Internal(format!("unencodable subject mirror: {e}")))?;
        self.store
            .put(Collection::Subjects, &mirror.id, document)
            .await?;
        Ok(())
    }

    /// Fail on a non-success registry status.
    pub(crate) fn require_success(response: bridge_registry::RegistryResponse) -> Result<JsonValue> {
        if !response.is_success() {
            return Err(Error::Upstream {
                status: response.status,
                message: response.body.to_string(),
            });
        }
        Ok(response.body)
    }
}
