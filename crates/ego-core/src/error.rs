use thiserror::Error;

/// Top-level error type shared by the ego crates.
#[derive(Error, Debug)]
pub enum EgoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EgoError>;
