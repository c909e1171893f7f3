//! Translation and synchronization engine.
//!
//! Turns clinical exchange documents into longitudinal registry writes:
//! subjects, program enrollments, stage events, and single data values.
//! Reference-data lookups go through [`MappingResolver`]; registry state per
//! subject is mirrored locally as an immutable [`SubjectMirror`] value, and a
//! dedup guard rejects writes that repeat mirrored state before any remote
//! call is made.

mod concept;
mod dedup;
mod error;
mod locks;
mod mirror;
mod resolver;
mod service;
mod translators;

pub use concept::{CodeMapping, Concept, DataElementInfo, ProgramRef, StageInfo, TARGET_SYSTEM};
pub use dedup::{check_new_encounter, check_new_enrollment};
pub use error::{Error, Result};
pub use locks::SubjectLocks;
pub use mirror::{Cardinality, EncounterMirror, EnrollmentMirror, SubjectMirror};
pub use resolver::MappingResolver;
pub use service::TranslationService;
