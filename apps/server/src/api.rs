//! HTTP API: routing and handlers.

use crate::{error::Error, state::AppState, Result};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use bridge_models::ClinicalDocument;
use bridge_store::Collection;
use serde_json::{json, Value as JsonValue};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/fhir", post(translate))
        .route("/synchronize", post(synchronize))
        .route("/index/:collection/:id", post(index_document))
        .route("/get/:collection/:id", get(get_document))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

/// Translate one clinical document (or a bundle of them).
///
/// Single documents surface the error taxonomy as HTTP statuses; bundles
/// always answer 200 with per-entry outcomes in order.
async fn translate(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>> {
    let declared = ClinicalDocument::declared_type(&body)
        .unwrap_or("(none)")
        .to_string();
    let document = ClinicalDocument::from_value(body)
        .map_err(|_| Error::BadRequest(format!("unsupported resource type {declared}")))?;

    let outcome = state.translator.translate(&document).await?;
    Ok(Json(outcome))
}

/// Pull reference data from the registry into the document store.
async fn synchronize(State(state): State<AppState>) -> Result<Json<crate::sync::SyncReport>> {
    let report = state.sync.synchronize().await?;
    Ok(Json(report))
}

/// Index a curated document (mapping concepts, mostly) under an explicit id.
async fn index_document(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(document): Json<JsonValue>,
) -> Result<Json<JsonValue>> {
    let collection: Collection = collection.parse()?;
    state.store.put(collection, &id, document).await?;
    Ok(Json(json!({ "indexed": id, "collection": collection.as_str() })))
}

async fn get_document(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<JsonValue>> {
    let collection: Collection = collection.parse()?;
    match state.store.get(collection, &id).await? {
        Some(document) => Ok(Json(document)),
        None => Err(Error::NotFound(format!("no document {id} in {collection}"))),
    }
}
