//! Observation translator: one coded value onto an existing event.

use crate::{service::TranslationService, Error, Result};
use bridge_models::Observation;
use bridge_registry::{DataValue, Event};
use serde_json::Value as JsonValue;

impl TranslationService {
    pub async fn translate_observation(&self, observation: &Observation) -> Result<JsonValue> {
        let coding = observation
            .code_coding()
            .ok_or_else(|| Error::Validation("observation carries no coding".to_string()))?;
        let (Some(system), Some(code)) = (coding.system.as_deref(), coding.code.as_deref()) else {
            return Err(Error::Validation(
                "observation coding lacks system or code".to_string(),
            ));
        };

        let value = observation.primitive_value().ok_or_else(|| {
            Error::Validation("observation carries no primitive value".to_string())
        })?;

        let subject_key = observation
            .subject
            .identifier_value()
            .ok_or_else(|| {
                Error::Validation("observation subject reference carries no identifier".to_string())
            })?
            .to_string();

        let encounter_reference = observation.encounter.identifier_value().ok_or_else(|| {
            Error::Validation("observation encounter reference carries no identifier".to_string())
        })?;

        let data_element = self.resolver.data_element(system, code).await?;

        let lock = self.locks.lock_for(&subject_key);
        let _guard = lock.lock().await;

        let subject = self
            .find_subject(std::slice::from_ref(&subject_key))
            .await?
            .ok_or_else(|| Error::NotFound(format!("no subject known for {subject_key}")))?;

        let encounter = subject.encounter_by_reference(encounter_reference);
        let (Some(encounter), Some(data_element)) = (encounter, data_element) else {
            return Err(Error::NotFound(format!(
                "no event or data element mapped for observation {system}|{code} on encounter {encounter_reference}"
            )));
        };

        // The update body is the event itself carrying the single value;
        // the registry merges it into the addressed data element.
        let update = Event {
            event: encounter.id.clone(),
            program: encounter.program.clone(),
            program_stage: encounter.program_stage.clone(),
            tracked_entity_instance: subject.id.clone(),
            org_unit: encounter.org_unit.clone(),
            enrollment: encounter.enrollment.clone(),
            event_date: encounter.event_date.clone(),
            data_values: vec![DataValue {
                data_element: data_element.code.clone(),
                value,
            }],
        };

        tracing::debug!(
            event = %update.event,
            data_element = %data_element.code,
            "updating event data value"
        );
        Self::require_success(
            self.registry
                .update_event_data_value(&update, &update.event, &data_element.code)
                .await?,
        )
    }
}
