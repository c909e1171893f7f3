use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid store document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
