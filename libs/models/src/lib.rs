//! Value types for inbound clinical-exchange documents.
//!
//! These are plain serde representations of the document subset the
//! translation engine consumes. No validation - just data representation;
//! required-field rules live in the translators.

mod bundle;
mod common;
mod encounter;
mod episode;
mod observation;
mod patient;

pub use bundle::{Bundle, BundleEntry, ClinicalDocument};
pub use common::{
    Address, CodeableConcept, Coding, ContactPoint, Extension, HumanName, Identifier, Period,
    Quantity, Reference, ValueX,
};
pub use encounter::Encounter;
pub use episode::EpisodeOfCare;
pub use observation::Observation;
pub use patient::Patient;
