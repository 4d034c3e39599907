//! Bounded-concurrency expansion engine.
//!
//! Every frontier node is submitted as its own tokio task up front; a
//! semaphore with one permit per worker limits how many fetch at once. The
//! engine then joins on all of them. The tasks share only the API handle
//! (and through it the rate-limit gate) and the semaphore; each produces an
//! independent record, so aggregation needs no locking.

use std::sync::Arc;

use ego_client::{FetchLimits, GraphApi};
use ego_core::{AccountId, AdjacencyRecord};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{default_worker_count, FailurePolicy};
use crate::error::{ExpandError, Result};
use crate::frontier;

/// A node whose expansion failed under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedNode {
    pub account: AccountId,
    pub reason: String,
}

/// Outcome of one frontier expansion. Record order is completion order.
#[derive(Debug, Default)]
pub struct ExpansionReport {
    pub records: Vec<AdjacencyRecord>,
    pub failed: Vec<FailedNode>,
}

/// Expands frontier nodes in parallel against one shared API handle.
pub struct ExpansionEngine {
    api: Arc<dyn GraphApi>,
    limits: FetchLimits,
    workers: usize,
    policy: FailurePolicy,
}

impl ExpansionEngine {
    /// Create an engine sized to the machine, aborting on first failure.
    pub fn new(api: Arc<dyn GraphApi>, limits: FetchLimits) -> Self {
        Self {
            api,
            limits,
            workers: default_worker_count(),
            policy: FailurePolicy::Abort,
        }
    }

    /// Override the worker pool size (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetch the following list of every node.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure cancels all tasks
    /// still queued or in flight and the completed work is discarded. Under
    /// [`FailurePolicy::Skip`] failures are collected in the report instead.
    pub async fn expand_frontier<I>(&self, nodes: I) -> Result<ExpansionReport>
    where
        I: IntoIterator<Item = AccountId>,
    {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for account in nodes {
            let api = self.api.clone();
            let limits = self.limits.clone();
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .expect("expansion semaphore closed");
                let result = frontier::resolve_frontier(api.as_ref(), account, &limits).await;
                (account, result)
            });
        }

        let submitted = tasks.len();
        tracing::info!(
            submitted,
            workers = self.workers,
            policy = ?self.policy,
            "Expansion started"
        );

        let mut report = ExpansionReport::default();
        while let Some(joined) = tasks.join_next().await {
            let (account, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tasks.abort_all();
                    return Err(ExpandError::WorkerPanicked(e.to_string()));
                }
            };

            match result {
                Ok(record) => report.records.push(record),
                Err(source) => match self.policy {
                    FailurePolicy::Abort => {
                        tasks.abort_all();
                        tracing::error!(
                            user = %account,
                            error = %source,
                            completed = report.records.len(),
                            submitted,
                            "Expansion failed, aborting batch"
                        );
                        return Err(ExpandError::NodeFailed { account, source });
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!(user = %account, error = %source, "Expansion failed, skipping node");
                        report.failed.push(FailedNode {
                            account,
                            reason: source.to_string(),
                        });
                    }
                },
            }
        }

        tracing::info!(
            expanded = report.records.len(),
            failed = report.failed.len(),
            "Expansion complete"
        );
        Ok(report)
    }
}
