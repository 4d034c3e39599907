//! Frontier resolution: an account's current following list.

use ego_client::{fetch_following, ClientError, FetchLimits, GraphApi};
use ego_core::{AccountId, AdjacencyRecord};

/// Look up the seed account by handle and fetch who it follows.
pub async fn resolve_seed_frontier(
    api: &dyn GraphApi,
    seed_username: &str,
    limits: &FetchLimits,
) -> Result<AdjacencyRecord, ClientError> {
    let seed = api.user_by_username(seed_username).await?;
    tracing::info!(seed = %seed_username, user = %seed.id, "Resolved seed account");

    let record = resolve_frontier(api, seed.id, limits).await?;
    tracing::info!(
        user = %record.user,
        following = record.len(),
        "Seed frontier resolved"
    );
    Ok(record)
}

/// Fetch the following list of an already-known account.
pub async fn resolve_frontier(
    api: &dyn GraphApi,
    account: AccountId,
    limits: &FetchLimits,
) -> Result<AdjacencyRecord, ClientError> {
    let following = fetch_following(api, account, limits).await?;
    Ok(AdjacencyRecord::new(account, following))
}
