//! Dedup against the ledger of earlier runs.
//!
//! Every account that appears as `user` in any earlier run file has already
//! been expanded and is never expanded again.

use std::collections::HashSet;

use ego_core::AccountId;

use crate::persist;
use crate::store::{RunStore, StoreError};

/// Counts reported before the expansion phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierSummary {
    pub previously_known: usize,
    pub currently_following: usize,
    pub new_count: usize,
}

/// Union of the `user` column across every run file matching `pattern`.
pub fn load_known_sources(
    store: &dyn RunStore,
    pattern: &str,
) -> Result<HashSet<AccountId>, StoreError> {
    let files = store.list(pattern)?;
    let mut known = HashSet::new();

    for path in &files {
        let reader = store.open(path)?;
        known.extend(persist::read_sources(reader, path)?);
    }

    tracing::debug!(files = files.len(), known = known.len(), "Loaded dedup ledger");
    Ok(known)
}

/// Accounts in `current` that are not in `known`, each exactly once.
pub fn compute_new_frontier(
    current: &[AccountId],
    known: &HashSet<AccountId>,
) -> HashSet<AccountId> {
    current
        .iter()
        .filter(|id| !known.contains(id))
        .copied()
        .collect()
}

pub fn summarize(
    current: &[AccountId],
    known: &HashSet<AccountId>,
    frontier: &HashSet<AccountId>,
) -> FrontierSummary {
    FrontierSummary {
        previously_known: known.len(),
        currently_following: current.len(),
        new_count: frontier.len(),
    }
}
