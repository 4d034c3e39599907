//! One full run: seed resolve → dedup → expand → materialize.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ego_client::GraphApi;
use ego_core::AccountId;
use uuid::Uuid;

use crate::config::ExpandConfig;
use crate::diff::{self, FrontierSummary};
use crate::error::Result;
use crate::expand::{ExpansionEngine, FailedNode};
use crate::frontier;
use crate::persist;
use crate::store::RunStore;

/// What a run did.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub seed: AccountId,
    pub frontier: FrontierSummary,
    pub records_written: usize,
    /// Only populated under the skip failure policy.
    pub failed: Vec<FailedNode>,
    /// `None` when there was nothing new to expand.
    pub output: Option<PathBuf>,
    pub duration: Duration,
}

/// Execute a single expansion run for `seed_username`.
///
/// Nothing is written unless every stage succeeds; the run file is named
/// after `now`.
pub async fn run_once(
    api: Arc<dyn GraphApi>,
    store: &dyn RunStore,
    config: &ExpandConfig,
    seed_username: &str,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    config.validate()?;
    let run_id = Uuid::new_v4();
    let start = Instant::now();
    let limits = config.fetch_limits();

    tracing::info!(run_id = %run_id, seed = %seed_username, "Starting expansion run");

    let seed = frontier::resolve_seed_frontier(api.as_ref(), seed_username, &limits).await?;

    let known = diff::load_known_sources(store, &persist::ledger_pattern(&config.file_prefix))?;
    let new_frontier = diff::compute_new_frontier(&seed.following, &known);
    let summary = diff::summarize(&seed.following, &known, &new_frontier);

    tracing::info!(
        run_id = %run_id,
        previously_known = summary.previously_known,
        currently_following = summary.currently_following,
        new = summary.new_count,
        "Frontier computed"
    );

    if new_frontier.is_empty() {
        tracing::info!(run_id = %run_id, "No new accounts to expand");
        return Ok(RunSummary {
            run_id,
            seed: seed.user,
            frontier: summary,
            records_written: 0,
            failed: Vec::new(),
            output: None,
            duration: start.elapsed(),
        });
    }

    let engine = ExpansionEngine::new(api, limits)
        .with_workers(config.worker_count())
        .with_failure_policy(config.failure_policy);
    let report = engine.expand_frontier(new_frontier).await?;

    let output = if report.records.is_empty() {
        tracing::warn!(run_id = %run_id, failed = report.failed.len(), "Every expansion failed, nothing written");
        None
    } else {
        let file_name = persist::run_file_name(&config.file_prefix, now);
        Some(persist::materialize(store, &report.records, &file_name)?)
    };

    let duration = start.elapsed();
    tracing::info!(
        run_id = %run_id,
        written = report.records.len(),
        failed = report.failed.len(),
        duration_ms = duration.as_millis(),
        "Expansion run complete"
    );

    Ok(RunSummary {
        run_id,
        seed: seed.user,
        frontier: summary,
        records_written: if output.is_some() { report.records.len() } else { 0 },
        failed: report.failed,
        output,
        duration,
    })
}
