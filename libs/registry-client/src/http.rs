//! HTTP implementation of the registry client.

use crate::{
    models::{MetadataKind, RegistryResponse},
    Enrollment, Event, RegistryClient, RegistryError, Result, TrackedEntity,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Bounded retry for transport failures and 5xx answers.
///
/// Safe for the submission operations because identifiers are allocated
/// before submission; a replayed create is idempotent at the registry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
        }
    }
}

pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry: RetryPolicy,
}

impl HttpRegistryClient {
    pub fn new(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Self::with_retry(base_url, username, password, timeout, RetryPolicy::default())
    }

    pub fn with_retry(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let login = format!("{username}:{password}");
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", STANDARD.encode(login)),
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Run one request builder with the configured retry policy.
    async fn execute(&self, build: impl Fn() -> reqwest::RequestBuilder) -> Result<RegistryResponse> {
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0;

        loop {
            let result = build()
                .header(reqwest::header::AUTHORIZATION, &self.auth_header)
                .send()
                .await;

            let retryable = match &result {
                Ok(response) => response.status().is_server_error(),
                Err(_) => true,
            };

            if retryable && attempt < self.retry.max_retries {
                attempt += 1;
                tracing::warn!(attempt, "registry call failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            let response = result?;
            let status = response.status().as_u16();
            let body = response
                .json::<JsonValue>()
                .await
                .unwrap_or(JsonValue::Null);
            return Ok(RegistryResponse { status, body });
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn new_identifier(&self) -> Result<String> {
        let response = self
            .execute(|| self.client.get(self.url("system/id")))
            .await?;

        if !response.is_success() {
            return Err(RegistryError::Status {
                status: response.status,
                message: response.body.to_string(),
            });
        }

        identifier_from_body(&response.body)
    }

    async fn create_subject(&self, subject: &TrackedEntity) -> Result<RegistryResponse> {
        self.execute(|| {
            self.client
                .post(self.url("trackedEntityInstances"))
                .json(subject)
        })
        .await
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> Result<RegistryResponse> {
        self.execute(|| self.client.post(self.url("enrollments")).json(enrollment))
            .await
    }

    async fn create_event(&self, event: &Event) -> Result<RegistryResponse> {
        self.execute(|| self.client.post(self.url("events")).json(event))
            .await
    }

    async fn update_event_data_value(
        &self,
        event: &Event,
        event_id: &str,
        data_element: &str,
    ) -> Result<RegistryResponse> {
        let path = format!("events/{event_id}/{data_element}");
        self.execute(|| self.client.put(self.url(&path)).json(event))
            .await
    }

    async fn metadata(&self, kind: MetadataKind) -> Result<JsonValue> {
        let mut query = vec![("fields", kind.fields()), ("paging", "false")];
        if let Some(filter) = kind.filter() {
            query.push(("filter", filter));
        }
        let response = self
            .execute(|| self.client.get(self.url(kind.path())).query(&query))
            .await?;

        if !response.is_success() {
            return Err(RegistryError::Status {
                status: response.status,
                message: response.body.to_string(),
            });
        }
        Ok(response.body)
    }
}

/// The id generator answers `{"codes": ["..."]}`; anything else is a
/// malformed response, not an upstream status failure.
fn identifier_from_body(body: &JsonValue) -> Result<String> {
    body.pointer("/codes/0")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            RegistryError::Decode(format!("id generator answered without codes: {body}"))
        })
}
