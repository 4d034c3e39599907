//! ego-expand: One-hop expansion of a seed account's follow graph.
//!
//! Resolves who the seed follows, drops every account already expanded in
//! an earlier run, fetches the remaining accounts' following lists in
//! parallel, and writes them to a new timestamped run file.

pub mod config;
pub mod diff;
pub mod error;
pub mod expand;
pub mod frontier;
pub mod persist;
pub mod pipeline;
pub mod store;

pub use error::{ExpandError, Result};
