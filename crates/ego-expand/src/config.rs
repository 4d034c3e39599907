//! Configuration for the ego-expand run.

use std::time::Duration;

use ego_client::api::{MAX_FOLLOWING_RESULTS, MAX_PAGE_SIZE};
use ego_client::{ClientConfig, FetchLimits};
use serde::Deserialize;

use crate::error::{ExpandError, Result};

/// Top-level expansion configuration.
///
/// Loaded from `ego.toml` `[expand]` section or
/// `EGO_EXPAND__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpandConfig {
    /// Directory holding the run files (the dedup ledger).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name prefix for run files (default: "users_following").
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Base URL of the remote graph API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Ids requested per following page (max 1000).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Cap on following ids kept per account (max 5000).
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Pause before each emitted id, in milliseconds.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Concurrent expansions. Unset means one less than the available cores.
    #[serde(default)]
    pub workers: Option<usize>,

    /// What a single failed expansion does to the batch.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Batch behaviour when one node's fetch fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole batch; nothing is written.
    #[default]
    Abort,
    /// Report the node as failed, leave it out of the output, keep going.
    Skip,
}

impl ExpandConfig {
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            page_size: self.page_size,
            max_results: self.max_results,
            item_delay: Duration::from_millis(self.item_delay_ms),
        }
    }

    /// Worker pool size: the configured value, or `max(1, cores - 1)`.
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|n| *n > 0)
            .unwrap_or_else(default_worker_count)
    }

    pub fn client_config(&self, bearer_token: &str) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            bearer_token: bearer_token.to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.trim().is_empty() {
            return Err(ExpandError::Config("file_prefix must not be empty".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ExpandError::Config(format!(
                "page_size must be within 1..={MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.max_results == 0 || self.max_results > MAX_FOLLOWING_RESULTS {
            return Err(ExpandError::Config(format!(
                "max_results must be within 1..={MAX_FOLLOWING_RESULTS}, got {}",
                self.max_results
            )));
        }
        Ok(())
    }
}

/// One less than the available hardware parallelism, minimum 1, leaving a
/// core for the orchestrating task.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_file_prefix() -> String {
    "users_following".to_string()
}

fn default_api_base_url() -> String {
    ego_client::client::DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_max_results() -> usize {
    5000
}

fn default_item_delay_ms() -> u64 {
    100
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_prefix: default_file_prefix(),
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            max_results: default_max_results(),
            item_delay_ms: default_item_delay_ms(),
            workers: None,
            failure_policy: FailurePolicy::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExpandConfig::default();
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.file_prefix, "users_following");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());

        let limits = config.fetch_limits();
        assert_eq!(limits.page_size, 1000);
        assert_eq!(limits.max_results, 5000);
        assert_eq!(limits.item_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_worker_count_leaves_headroom() {
        let config = ExpandConfig::default();
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(config.worker_count(), cores.saturating_sub(1).max(1));
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_explicit_workers_win() {
        let config = ExpandConfig {
            workers: Some(3),
            ..ExpandConfig::default()
        };
        assert_eq!(config.worker_count(), 3);

        let zero = ExpandConfig {
            workers: Some(0),
            ..ExpandConfig::default()
        };
        assert_eq!(zero.worker_count(), default_worker_count());
    }

    #[test]
    fn test_failure_policy_deserializes_lowercase() {
        let policy: FailurePolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, FailurePolicy::Skip);
    }

    #[test]
    fn test_validate_rejects_bad_page_size() {
        let config = ExpandConfig {
            page_size: 5000,
            ..ExpandConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExpandError::Config(_))));
    }

    #[test]
    fn test_validate_bounds_max_results() {
        let over = ExpandConfig {
            max_results: 5001,
            ..ExpandConfig::default()
        };
        assert!(matches!(over.validate(), Err(ExpandError::Config(_))));

        let zero = ExpandConfig {
            max_results: 0,
            ..ExpandConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ExpandError::Config(_))));

        let at_cap = ExpandConfig {
            max_results: 5000,
            ..ExpandConfig::default()
        };
        assert!(at_cap.validate().is_ok());
    }
}
