//! Encounter translator: visit documents to program-stage events.

use crate::{
    dedup,
    mirror::{Cardinality, EncounterMirror},
    service::TranslationService,
    Error, Result,
};
use bridge_models::Encounter;
use bridge_registry::Event;
use serde_json::Value as JsonValue;

impl TranslationService {
    pub async fn translate_encounter(&self, encounter: &Encounter) -> Result<JsonValue> {
        let coding = encounter
            .type_coding()
            .ok_or_else(|| Error::Validation("encounter carries no type coding".to_string()))?;
        let (Some(system), Some(code)) = (coding.system.as_deref(), coding.code.as_deref()) else {
            return Err(Error::Validation(
                "encounter type coding lacks system or code".to_string(),
            ));
        };
        let stage = self.resolver.stage(system, code).await?.ok_or_else(|| {
            Error::NotFound(format!("no program stage mapped for {system}|{code}"))
        })?;

        let source_reference = encounter
            .identifier_value()
            .ok_or_else(|| Error::Validation("encounter carries no identifier".to_string()))?
            .to_string();

        let subject_key = encounter
            .subject
            .identifier_value()
            .ok_or_else(|| {
                Error::Validation("encounter subject reference carries no identifier".to_string())
            })?
            .to_string();

        let event_date = encounter
            .period
            .as_ref()
            .and_then(|p| p.start_date())
            .ok_or_else(|| Error::Validation("encounter has no start date".to_string()))?
            .to_string();

        let lock = self.locks.lock_for(&subject_key);
        let _guard = lock.lock().await;

        let subject = self
            .find_subject(std::slice::from_ref(&subject_key))
            .await?
            .ok_or_else(|| Error::NotFound(format!("no subject known for {subject_key}")))?;

        // The stage's program must hold exactly one enrollment. Zero means
        // the episode never arrived; more than one has no defined owner.
        let enrollment = match subject.enrollment_for_program(&stage.program) {
            Cardinality::One(enrollment) => enrollment.clone(),
            Cardinality::None => {
                return Err(Error::NotFound(format!(
                    "subject {} has no enrollment in program {}",
                    subject.id, stage.program
                )))
            }
            Cardinality::Many(count) => {
                return Err(Error::NotFound(format!(
                    "subject {} has {count} enrollments in program {}",
                    subject.id, stage.program
                )))
            }
        };

        dedup::check_new_encounter(&subject, &stage)?;

        let id = self.registry.new_identifier().await?;
        let candidate = Event {
            event: id.clone(),
            program: stage.program.clone(),
            program_stage: stage.stage.clone(),
            tracked_entity_instance: subject.id.clone(),
            org_unit: subject.org_unit.clone(),
            enrollment: enrollment.id.clone(),
            event_date: event_date.clone(),
            data_values: Vec::new(),
        };

        tracing::debug!(subject = %subject.id, stage = %stage.stage, "submitting event");
        let body = Self::require_success(self.registry.create_event(&candidate).await?)?;

        let mirror = subject.with_encounter(EncounterMirror {
            id,
            program: stage.program,
            program_stage: stage.stage,
            enrollment: enrollment.id,
            org_unit: candidate.org_unit,
            event_date,
            source_reference,
        });
        self.put_subject(&mirror).await?;

        Ok(body)
    }
}
