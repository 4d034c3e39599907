//! ego-core: Shared types, credentials, and error handling for ego network expansion.
//!
//! This crate provides the foundational pieces used across the ego crates:
//! - Account identifiers and adjacency records
//! - Credential loading for the remote graph API
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Credentials;
pub use error::EgoError;
pub use types::{Account, AccountId, AdjacencyRecord};
