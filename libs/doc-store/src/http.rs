//! HTTP implementation against an Elasticsearch-compatible search API.

use crate::{Collection, DocumentStore, Result, StoreError};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentStore {
    /// `base_url` is the root of the search API, without a trailing slash.
    /// Every call carries an explicit timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn doc_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.base_url,
            collection.as_str(),
            urlencoding::encode(id)
        )
    }

    /// Write URL. `wait_for` blocks the write until it is searchable, so a
    /// search issued after `put` returns always sees the document; batch
    /// entries depend on state written by earlier entries through searches.
    fn index_url(&self, collection: Collection, id: &str) -> String {
        format!("{}?refresh=wait_for", self.doc_url(collection, id))
    }

    fn search_url(&self, collection: Collection) -> String {
        format!("{}/{}/_search", self.base_url, collection.as_str())
    }

    async fn search(&self, collection: Collection, query: JsonValue) -> Result<Vec<JsonValue>> {
        let response = self
            .client
            .post(self.search_url(collection))
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        // A missing index behaves like an empty collection.
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: JsonValue = response.json().await?;
        let hits = body
            .pointer("/hits/hits")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(hits
            .into_iter()
            .filter_map(|mut hit| hit.get_mut("_source").map(JsonValue::take))
            .collect())
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn put(&self, collection: Collection, id: &str, document: JsonValue) -> Result<()> {
        let response = self
            .client
            .put(self.index_url(collection, id))
            .json(&document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        tracing::debug!(collection = %collection, id, "document indexed");
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>> {
        let response = self.client.get(self.doc_url(collection, id)).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let mut body: JsonValue = response.json().await?;
        Ok(body.get_mut("_source").map(JsonValue::take))
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Option<JsonValue>> {
        let hits = self
            .search(collection, json!({ "match": { field: value } }))
            .await?;
        Ok(hits.into_iter().next())
    }

    async fn find_by_code_mapping(
        &self,
        collection: Collection,
        system: &str,
        code: &str,
    ) -> Result<Option<JsonValue>> {
        let query = json!({
            "bool": {
                "must": [
                    { "match": { "mappings.system": system } },
                    { "match": { "mappings.code": code } }
                ]
            }
        });
        let hits = self.search(collection, query).await?;
        Ok(hits.into_iter().next())
    }

    async fn find_by_identifier_set(
        &self,
        collection: Collection,
        field: &str,
        values: &[String],
    ) -> Result<Vec<JsonValue>> {
        self.search(collection, identifier_set_query(field, values))
            .await
    }
}

/// Terms query over the keyword subfield. The analyzed text field holds
/// lowercased tokens, so exact values with uppercase would never match it.
fn identifier_set_query(field: &str, values: &[String]) -> JsonValue {
    json!({ "terms": { (format!("{field}.keyword")): values } })
}
