//! Error types for the ego-expand crate.

use ego_client::ClientError;
use ego_core::AccountId;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Expansion of account {account} failed: {source}")]
    NodeFailed {
        account: AccountId,
        #[source]
        source: ClientError,
    },

    #[error("Expansion worker panicked: {0}")]
    WorkerPanicked(String),
}

pub type Result<T> = std::result::Result<T, ExpandError>;
