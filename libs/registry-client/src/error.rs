use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("registry response could not be decoded: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
