//! Dedup guard: decides whether a candidate write represents new state.
//!
//! Pure functions over the mirrored subject; translators call these before
//! issuing any registry write, so a duplicate costs zero remote calls.

use crate::{concept::StageInfo, mirror::SubjectMirror, Error, Result};

/// A candidate enrollment duplicates an existing one when program, org unit,
/// and enrollment date all match.
pub fn check_new_enrollment(
    subject: &SubjectMirror,
    program: &str,
    org_unit: &str,
    enrollment_date: &str,
) -> Result<()> {
    let duplicate = subject.enrollments.iter().any(|e| {
        e.program == program && e.org_unit == org_unit && e.enrollment_date == enrollment_date
    });
    if duplicate {
        return Err(Error::Duplicate(format!(
            "subject {} already enrolled in program {} at {} on {}",
            subject.id, program, org_unit, enrollment_date
        )));
    }
    Ok(())
}

/// A non-repeatable stage admits at most one encounter per subject.
pub fn check_new_encounter(subject: &SubjectMirror, stage: &StageInfo) -> Result<()> {
    if !stage.repeatable && subject.has_encounter_for_stage(&stage.stage) {
        return Err(Error::Duplicate(format!(
            "subject {} already has an encounter for non-repeatable stage {}",
            subject.id, stage.stage
        )));
    }
    Ok(())
}
