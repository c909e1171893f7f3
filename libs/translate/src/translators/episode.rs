//! Care-episode translator: episode documents to program enrollments.

use crate::{dedup, mirror::EnrollmentMirror, service::TranslationService, Error, Result};
use bridge_models::EpisodeOfCare;
use bridge_registry::Enrollment;
use serde_json::Value as JsonValue;

impl TranslationService {
    pub async fn translate_episode(&self, episode: &EpisodeOfCare) -> Result<JsonValue> {
        let coding = episode
            .program_coding()
            .ok_or_else(|| Error::Validation("episode carries no program coding".to_string()))?;
        let (Some(system), Some(code)) = (coding.system.as_deref(), coding.code.as_deref()) else {
            return Err(Error::Validation(
                "episode program coding lacks system or code".to_string(),
            ));
        };
        let program = self.resolver.program(system, code).await?.ok_or_else(|| {
            Error::NotFound(format!("no program mapped for {system}|{code}"))
        })?;

        let subject_key = episode
            .patient
            .identifier_value()
            .ok_or_else(|| {
                Error::Validation("episode subject reference carries no identifier".to_string())
            })?
            .to_string();

        let enrollment_date = episode
            .period
            .as_ref()
            .and_then(|p| p.start_date())
            .ok_or_else(|| Error::Validation("episode has no start date".to_string()))?
            .to_string();

        let lock = self.locks.lock_for(&subject_key);
        let _guard = lock.lock().await;

        let subject = self
            .find_subject(std::slice::from_ref(&subject_key))
            .await?
            .ok_or_else(|| Error::NotFound(format!("no subject known for {subject_key}")))?;
        if subject.org_unit.is_empty() || subject.entity_type.is_empty() {
            return Err(Error::NotFound(format!(
                "subject {} is not eligible for enrollment",
                subject.id
            )));
        }

        dedup::check_new_enrollment(&subject, &program, &subject.org_unit, &enrollment_date)?;

        let id = self.registry.new_identifier().await?;
        let candidate = Enrollment {
            enrollment: id.clone(),
            tracked_entity_instance: subject.id.clone(),
            program: program.clone(),
            org_unit: subject.org_unit.clone(),
            enrollment_date: enrollment_date.clone(),
            incident_date: enrollment_date.clone(),
        };

        tracing::debug!(subject = %subject.id, %program, "submitting enrollment");
        let body = Self::require_success(self.registry.create_enrollment(&candidate).await?)?;

        let mirror = subject.with_enrollment(EnrollmentMirror {
            id,
            program,
            org_unit: candidate.org_unit,
            enrollment_date: candidate.enrollment_date,
            incident_date: candidate.incident_date,
        });
        self.put_subject(&mirror).await?;

        Ok(body)
    }
}
