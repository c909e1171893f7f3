//! Bundle translator and the top-level dispatch entry point.

use crate::{service::TranslationService, Result};
use bridge_models::{Bundle, ClinicalDocument};
use futures::future::BoxFuture;
use serde_json::{json, Value as JsonValue};

impl TranslationService {
    /// Translate one typed document, surfacing the error taxonomy. Bundles
    /// never fail as a whole; their outcome carries per-entry results.
    pub async fn translate(&self, document: &ClinicalDocument) -> Result<JsonValue> {
        match document {
            ClinicalDocument::Patient(patient) => self.translate_patient(patient).await,
            ClinicalDocument::EpisodeOfCare(episode) => self.translate_episode(episode).await,
            ClinicalDocument::Encounter(encounter) => self.translate_encounter(encounter).await,
            ClinicalDocument::Observation(observation) => {
                self.translate_observation(observation).await
            }
            ClinicalDocument::Bundle(bundle) => Ok(self.translate_bundle(bundle).await),
        }
    }

    /// Translate one raw document of any supported type.
    ///
    /// Never fails: per-document errors become structured error objects so a
    /// bundle can report each entry's outcome in position.
    pub fn translate_value(&self, value: JsonValue) -> BoxFuture<'_, JsonValue> {
        Box::pin(async move {
            let declared = ClinicalDocument::declared_type(&value)
                .unwrap_or("(none)")
                .to_string();
            let document = match ClinicalDocument::from_value(value) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!(resource_type = %declared, "unsupported document: {e}");
                    return json!({
                        "error": format!("unsupported resource type {declared}")
                    });
                }
            };
            self.translate_document(document).await
        })
    }

    pub async fn translate_document(&self, document: ClinicalDocument) -> JsonValue {
        match self.translate(&document).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(document = document.type_name(), "translation failed: {error}");
                json!({ "error": error.to_string() })
            }
        }
    }

    /// Translate a bundle's entries strictly in order, one at a time, so
    /// later entries can depend on the state earlier ones created.
    pub async fn translate_bundle(&self, bundle: &Bundle) -> JsonValue {
        let mut responses = Vec::with_capacity(bundle.entry.len());
        for entry in &bundle.entry {
            let Some(resource) = entry.resource.clone() else {
                responses.push(json!({ "error": "bundle entry carries no resource" }));
                continue;
            };
            // Nested bundles recurse; the boxed future breaks the cycle.
            let outcome: BoxFuture<'_, JsonValue> = self.translate_value(resource);
            responses.push(outcome.await);
        }
        json!({ "responses": responses })
    }
}
