//! The locally mirrored registry state of one subject.
//!
//! Mirror records are immutable value types; every change goes through a
//! reducer returning a new value. The engine only ever appends: no reducer
//! removes an enrollment or encounter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMirror {
    /// The subject's registry identifier.
    pub id: String,
    pub org_unit: String,
    pub entity_type: String,
    /// Source identifier values that address this subject.
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentMirror>,
    #[serde(default)]
    pub encounters: Vec<EncounterMirror>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentMirror {
    pub id: String,
    pub program: String,
    pub org_unit: String,
    pub enrollment_date: String,
    pub incident_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterMirror {
    pub id: String,
    pub program: String,
    pub program_stage: String,
    pub enrollment: String,
    pub org_unit: String,
    pub event_date: String,
    /// Identifier of the originating encounter document; observations locate
    /// the encounter through it.
    pub source_reference: String,
}

/// Result of a singleton lookup. `Many` carries no payload because the
/// ambiguous case has no defined disambiguation policy; callers treat it
/// exactly like `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cardinality<T> {
    None,
    One(T),
    Many(usize),
}

impl SubjectMirror {
    pub fn new(
        id: impl Into<String>,
        org_unit: impl Into<String>,
        entity_type: impl Into<String>,
        identifiers: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            org_unit: org_unit.into(),
            entity_type: entity_type.into(),
            identifiers,
            enrollments: Vec::new(),
            encounters: Vec::new(),
        }
    }

    /// Append an enrollment.
    pub fn with_enrollment(mut self, enrollment: EnrollmentMirror) -> Self {
        self.enrollments.push(enrollment);
        self
    }

    /// Append an encounter.
    pub fn with_encounter(mut self, encounter: EncounterMirror) -> Self {
        self.encounters.push(encounter);
        self
    }

    /// Merge newly resolved identifier values, preserving order and dropping
    /// values already present.
    pub fn merged_identifiers(mut self, values: &[String]) -> Self {
        for value in values {
            if !self.identifiers.contains(value) {
                self.identifiers.push(value.clone());
            }
        }
        self
    }

    /// Select the single enrollment for a program.
    pub fn enrollment_for_program(&self, program: &str) -> Cardinality<&EnrollmentMirror> {
        let mut matches = self.enrollments.iter().filter(|e| e.program == program);
        match (matches.next(), matches.next()) {
            (None, _) => Cardinality::None,
            (Some(one), None) => Cardinality::One(one),
            (Some(_), Some(_)) => Cardinality::Many(2 + matches.count()),
        }
    }

    pub fn encounter_by_reference(&self, reference: &str) -> Option<&EncounterMirror> {
        self.encounters
            .iter()
            .find(|e| e.source_reference == reference)
    }

    pub fn has_encounter_for_stage(&self, stage: &str) -> bool {
        self.encounters.iter().any(|e| e.program_stage == stage)
    }
}
