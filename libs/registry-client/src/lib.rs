//! Client for the longitudinal health registry (tracker API).
//!
//! The translation engine only consumes the operations below; everything else
//! the registry offers is out of scope. `HttpRegistryClient` is the production
//! implementation; tests substitute their own fakes through the trait.

mod error;
mod http;
mod models;

pub use error::{RegistryError, Result};
pub use http::{HttpRegistryClient, RetryPolicy};
pub use models::{
    Attribute, DataValue, Enrollment, Event, MetadataKind, RegistryResponse, TrackedEntity,
};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Registry operations consumed by the translation engine.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Allocate a fresh identifier for a subject, enrollment, or event.
    async fn new_identifier(&self) -> Result<String>;

    /// Submit a new subject. 409 means the subject already exists and is
    /// treated as success by the caller.
    async fn create_subject(&self, subject: &TrackedEntity) -> Result<RegistryResponse>;

    async fn create_enrollment(&self, enrollment: &Enrollment) -> Result<RegistryResponse>;

    async fn create_event(&self, event: &Event) -> Result<RegistryResponse>;

    /// Merge a single data value into an existing event, addressed by event
    /// id and data-element code. Never a full overwrite.
    async fn update_event_data_value(
        &self,
        event: &Event,
        event_id: &str,
        data_element: &str,
    ) -> Result<RegistryResponse>;

    /// Fetch one kind of reference data (metadata synchronization shim).
    async fn metadata(&self, kind: MetadataKind) -> Result<JsonValue>;
}
