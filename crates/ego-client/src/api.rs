//! The seam between the expansion engine and the remote graph API.

use async_trait::async_trait;
use ego_core::{Account, AccountId};

use crate::error::Result;
use crate::types::FollowingPage;

/// Largest page the following endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Most following ids kept per account.
pub const MAX_FOLLOWING_RESULTS: usize = 5000;

/// Largest id or username batch the lookup endpoints accept.
pub const MAX_LOOKUP_BATCH: usize = 100;

/// Operations consumed from the remote graph API.
///
/// Implementations must absorb rate-limit responses (wait, then retry) and
/// only surface real failures. One instance is shared by every worker.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Look up one account by handle.
    async fn user_by_username(&self, username: &str) -> Result<Account>;

    /// Fetch one page of the accounts `account` follows.
    async fn following_page(
        &self,
        account: AccountId,
        page_size: u32,
        pagination_token: Option<&str>,
    ) -> Result<FollowingPage>;

    /// Look up accounts by id. Implementations split the request into
    /// batches of at most [`MAX_LOOKUP_BATCH`].
    async fn users_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>>;

    /// Look up accounts by handle, batched like [`GraphApi::users_by_ids`].
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<Account>>;
}
