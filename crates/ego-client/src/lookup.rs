//! Batched account lookups by id and by handle.

use ego_core::AccountId;

use crate::api::{GraphApi, MAX_LOOKUP_BATCH};
use crate::error::Result;

/// Render accounts as `name:username`, looking them up 100 at a time.
pub async fn describe_accounts(api: &dyn GraphApi, ids: &[AccountId]) -> Result<Vec<String>> {
    let mut described = Vec::with_capacity(ids.len());
    for batch in ids.chunks(MAX_LOOKUP_BATCH) {
        let accounts = api.users_by_ids(batch).await?;
        described.extend(accounts.iter().map(|a| a.describe()));
    }
    Ok(described)
}

/// Resolve handles to account ids, 100 at a time. Unknown handles are dropped.
pub async fn resolve_account_ids(api: &dyn GraphApi, usernames: &[String]) -> Result<Vec<AccountId>> {
    let mut ids = Vec::with_capacity(usernames.len());
    for batch in usernames.chunks(MAX_LOOKUP_BATCH) {
        let accounts = api.users_by_usernames(batch).await?;
        ids.extend(accounts.into_iter().map(|a| a.id));
    }
    Ok(ids)
}
