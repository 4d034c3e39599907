//! Error types for the ego-client crate.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Account {account} unavailable: {reason}")]
    Unavailable { account: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// Raised by a single request and consumed by the rate-limit retry loop.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
}

impl ClientError {
    pub fn unavailable(account: impl ToString, reason: impl Into<String>) -> Self {
        ClientError::Unavailable {
            account: account.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}
