//! Server-level error type and its HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Translation(#[from] bridge_translate::Error),

    #[error("document store error: {0}")]
    Store(#[from] bridge_store::StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] bridge_registry::RegistryError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Translation(bridge_translate::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            Error::Translation(bridge_translate::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Translation(bridge_translate::Error::Duplicate(_)) => StatusCode::CONFLICT,
            Error::Translation(bridge_translate::Error::Upstream { .. }) => StatusCode::BAD_GATEWAY,
            Error::Translation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(bridge_store::StoreError::UnknownCollection(_)) => StatusCode::BAD_REQUEST,
            Error::Store(_) => StatusCode::BAD_GATEWAY,
            Error::Registry(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {self}");
        } else {
            tracing::debug!(%status, "request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
