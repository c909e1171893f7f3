//! Error taxonomy of the translation engine.
//!
//! All four kinds are caught at the translator boundary and turned into a
//! structured per-document result; none of them aborts a batch run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required linking field is absent (identifier, org unit, entity
    /// type, program, encounter identifier, encounter-type mapping).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced subject, enrollment, encounter, or mapping is absent,
    /// or enrollment cardinality for a program is not exactly one.
    #[error("not found: {0}")]
    NotFound(String),

    /// The candidate duplicates state already mirrored for the subject.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The registry answered with a non-success status.
    #[error("registry returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("document store error: {0}")]
    Store(#[from] bridge_store::StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] bridge_registry::RegistryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
