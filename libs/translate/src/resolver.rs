//! Mapping resolver: source vocabulary codes to target registry codes.
//!
//! Absence is a normal, silent outcome. Every call site treats an unmapped
//! code as "omit this datum"; registries tolerate partial attribute sets but
//! not the rejection of a whole clinical record.

use crate::{
    concept::{Concept, DataElementInfo, StageInfo},
    Error, Result,
};
use bridge_store::{Collection, DocumentStore};
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub struct MappingResolver {
    store: Arc<dyn DocumentStore>,
}

impl MappingResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn decode(document: JsonValue) -> Result<Concept> {
        serde_json::from_value(document)
            .map_err(|e| Error::Internal(format!("malformed concept document: {e}")))
    }

    /// Concept whose mapping list contains the (source system, source code)
    /// pair, in the given category.
    async fn concept_by_code(
        &self,
        collection: Collection,
        system: &str,
        code: &str,
    ) -> Result<Option<Concept>> {
        match self
            .store
            .find_by_code_mapping(collection, system, code)
            .await?
        {
            Some(document) => Ok(Some(Self::decode(document)?)),
            None => Ok(None),
        }
    }

    /// Target code for a coded source value in the given category.
    pub async fn code_for(
        &self,
        collection: Collection,
        system: &str,
        code: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .concept_by_code(collection, system, code)
            .await?
            .and_then(|c| c.target_code().map(str::to_string)))
    }

    /// Attribute code for an identifier coding. Only concepts flagged as
    /// identifying qualify; their values feed the subject dedup set.
    pub async fn identifier_attribute(&self, system: &str, code: &str) -> Result<Option<String>> {
        Ok(self
            .concept_by_code(Collection::Attributes, system, code)
            .await?
            .filter(Concept::is_identifier)
            .and_then(|c| c.target_code().map(str::to_string)))
    }

    /// Attribute code for a fixed demographic field ("birthDate", "gender",
    /// ...) that carries no source coding system.
    pub async fn attribute_for_field(&self, field: &str) -> Result<Option<String>> {
        match self
            .store
            .find_by_field(Collection::Attributes, "type", field)
            .await?
        {
            Some(document) => Ok(Self::decode(document)?.target_code().map(str::to_string)),
            None => Ok(None),
        }
    }

    /// Attribute code for an extension, matched by mapping system == URL.
    /// Only concepts tagged as extensions qualify; a source-vocabulary
    /// mapping that happens to share the URL must not be mistaken for one.
    pub async fn attribute_for_extension(&self, url: &str) -> Result<Option<String>> {
        match self
            .store
            .find_by_field(Collection::Attributes, "mappings.system", url)
            .await?
        {
            Some(document) => Ok(Some(Self::decode(document)?)
                .filter(Concept::is_extension)
                .and_then(|c| c.target_code().map(str::to_string))),
            None => Ok(None),
        }
    }

    /// Org-unit code for a managing organization's (system, value) pair.
    pub async fn org_unit(&self, system: &str, value: &str) -> Result<Option<String>> {
        self.code_for(Collection::OrgUnits, system, value).await
    }

    /// The person entity type. Entity-type concepts named "person" or "case"
    /// (case-insensitive) are tagged at synchronization time.
    pub async fn person_entity_type(&self) -> Result<Option<String>> {
        match self
            .store
            .find_by_field(Collection::EntityTypes, "type", "Person")
            .await?
        {
            Some(document) => Ok(Self::decode(document)?.target_code().map(str::to_string)),
            None => Ok(None),
        }
    }

    /// Program code for a care-episode coding.
    pub async fn program(&self, system: &str, code: &str) -> Result<Option<String>> {
        self.code_for(Collection::Programs, system, code).await
    }

    /// Program stage for an encounter-type coding, with its owning program
    /// and repeatability flag.
    pub async fn stage(&self, system: &str, code: &str) -> Result<Option<StageInfo>> {
        let Some(concept) = self.concept_by_code(Collection::Stages, system, code).await? else {
            return Ok(None);
        };
        let (Some(stage), Some(program)) = (
            concept.target_code().map(str::to_string),
            concept.program.as_ref().map(|p| p.id.clone()),
        ) else {
            return Ok(None);
        };
        Ok(Some(StageInfo {
            stage,
            program,
            repeatable: concept.is_repeatable(),
        }))
    }

    /// Data-element code plus value type for an observation coding.
    pub async fn data_element(&self, system: &str, code: &str) -> Result<Option<DataElementInfo>> {
        let Some(concept) = self
            .concept_by_code(Collection::DataElements, system, code)
            .await?
        else {
            return Ok(None);
        };
        Ok(concept.target_code().map(|target| DataElementInfo {
            code: target.to_string(),
            value_type: concept.value_type.clone(),
        }))
    }
}
