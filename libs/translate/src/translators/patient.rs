//! Subject translator: demographic documents to tracked entities.

use crate::{service::TranslationService, Error, Result};
use bridge_models::Patient;
use bridge_registry::{Attribute, TrackedEntity};
use futures::future::try_join_all;
use serde_json::Value as JsonValue;

/// Fixed demographic fields with no source coding system, paired with the
/// value present on this document.
fn demographic_fields(patient: &Patient) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(name) = patient.first_name() {
        if let Some(family) = name.family.clone() {
            fields.push(("family", family));
        }
        if let Some(given) = name.given_as_single_string() {
            fields.push(("given", given));
        }
    }
    if let Some(gender) = patient.gender.clone() {
        fields.push(("gender", gender));
    }
    if let Some(birth_date) = patient.birth_date {
        fields.push(("birthDate", birth_date.format("%Y-%m-%d").to_string()));
    }
    if let Some(address) = patient.first_address_text() {
        fields.push(("address", address.to_string()));
    }
    if let Some(telecom) = patient.first_telecom_value() {
        fields.push(("telecom", telecom.to_string()));
    }
    fields
}

impl TranslationService {
    pub async fn translate_patient(&self, patient: &Patient) -> Result<JsonValue> {
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut identifier_values: Vec<String> = Vec::new();

        // Identifiers feed both the attribute list and the dedup set.
        // Unmapped codings are dropped, not failed.
        for identifier in &patient.identifier {
            let Some(value) = identifier.value.as_deref() else {
                continue;
            };
            let Some(coding) = identifier.type_.as_ref().and_then(|t| t.first_coding()) else {
                continue;
            };
            let (Some(system), Some(code)) = (coding.system.as_deref(), coding.code.as_deref())
            else {
                continue;
            };
            if let Some(attribute) = self.resolver.identifier_attribute(system, code).await? {
                attributes.push(Attribute {
                    attribute,
                    value: value.to_string(),
                });
                identifier_values.push(value.to_string());
            }
        }

        // Fixed fields are independent of one another; resolve concurrently.
        let fields = demographic_fields(patient);
        let resolved = try_join_all(
            fields
                .iter()
                .map(|(field, _)| self.resolver.attribute_for_field(field)),
        )
        .await?;
        for ((_, value), attribute) in fields.into_iter().zip(resolved) {
            if let Some(attribute) = attribute {
                attributes.push(Attribute { attribute, value });
            }
        }

        if let Some(marital_status) = &patient.marital_status {
            let display = marital_status
                .first_coding()
                .and_then(|c| c.display.clone())
                .or_else(|| marital_status.text.clone());
            if let Some(value) = display {
                if let Some(attribute) = self.resolver.attribute_for_field("maritalStatus").await? {
                    attributes.push(Attribute { attribute, value });
                }
            }
        }

        for extension in &patient.extension {
            let Some(value) = extension.value.as_ref().and_then(|v| v.primitive_value()) else {
                continue;
            };
            if let Some(attribute) = self.resolver.attribute_for_extension(&extension.url).await? {
                attributes.push(Attribute { attribute, value });
            }
        }

        let org_unit = match &patient.managing_organization {
            Some(organization) => match organization.identifier.as_ref() {
                Some(identifier) => match (identifier.system.as_deref(), identifier.value.as_deref())
                {
                    (Some(system), Some(value)) => self.resolver.org_unit(system, value).await?,
                    _ => None,
                },
                None => None,
            },
            None => None,
        };
        let entity_type = self.resolver.person_entity_type().await?;

        let (Some(org_unit), Some(entity_type), false) =
            (org_unit, entity_type, identifier_values.is_empty())
        else {
            return Err(Error::Validation(
                "missing patient identifier, organisation unit, or tracked entity type".to_string(),
            ));
        };

        // Hold every identifier key: a concurrent document may address the
        // same subject through any one of them.
        let _guards = self.locks.lock_many(&identifier_values).await;

        let existing = self.find_subject(&identifier_values).await?;
        let id = match &existing {
            Some(mirror) => mirror.id.clone(),
            None => self.registry.new_identifier().await?,
        };

        let candidate = TrackedEntity {
            tracked_entity_instance: id.clone(),
            tracked_entity_type: entity_type.clone(),
            org_unit: org_unit.clone(),
            attributes,
        };

        tracing::debug!(subject = %id, "submitting tracked entity");
        let response = self.registry.create_subject(&candidate).await?;
        // 409 means the registry already knows this subject; the submission
        // is idempotent and the mirror is still brought up to date.
        if !response.is_success_or_conflict() {
            return Err(Error::Upstream {
                status: response.status,
                message: response.body.to_string(),
            });
        }

        let mirror = match existing {
            Some(mirror) => mirror.merged_identifiers(&identifier_values),
            None => crate::mirror::SubjectMirror::new(id, org_unit, entity_type, identifier_values),
        };
        self.put_subject(&mirror).await?;

        Ok(response.body)
    }
}
