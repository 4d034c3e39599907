//! Paginated retrieval of one account's following list.

use std::time::Duration;

use ego_core::AccountId;

use crate::api::{GraphApi, MAX_FOLLOWING_RESULTS, MAX_PAGE_SIZE};
use crate::error::Result;

/// Caps and pacing for a single following-list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchLimits {
    /// Ids requested per page (clamped to 1..=1000).
    pub page_size: u32,
    /// Hard cap on ids returned for one account.
    pub max_results: usize,
    /// Pause before each emitted id, independent of page-level limits.
    pub item_delay: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_results: MAX_FOLLOWING_RESULTS,
            item_delay: Duration::from_millis(100),
        }
    }
}

/// Fetch the accounts `account` follows, in API order, following the
/// continuation cursor until `max_results` ids are collected or the last
/// page has been read.
pub async fn fetch_following(
    api: &dyn GraphApi,
    account: AccountId,
    limits: &FetchLimits,
) -> Result<Vec<AccountId>> {
    let page_size = limits.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut following = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0u32;

    'pages: while following.len() < limits.max_results {
        let page = api
            .following_page(account, page_size, token.as_deref())
            .await?;
        pages += 1;

        for id in page.ids {
            if following.len() >= limits.max_results {
                break 'pages;
            }
            if !limits.item_delay.is_zero() {
                tokio::time::sleep(limits.item_delay).await;
            }
            following.push(id);
        }

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    tracing::info!(
        user = %account,
        following = following.len(),
        pages,
        "Fetched following list"
    );
    Ok(following)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::types::FollowingPage;
    use async_trait::async_trait;
    use ego_core::Account;
    use std::sync::Mutex;

    /// Serves `edges` following ids in pages, recording every request.
    struct PagedSource {
        edges: u64,
        requests: Mutex<Vec<(u32, Option<String>)>>,
    }

    impl PagedSource {
        fn new(edges: u64) -> Self {
            Self {
                edges,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GraphApi for PagedSource {
        async fn user_by_username(&self, username: &str) -> crate::Result<Account> {
            Err(ClientError::unavailable(username, "not served"))
        }

        async fn following_page(
            &self,
            _account: AccountId,
            page_size: u32,
            pagination_token: Option<&str>,
        ) -> crate::Result<FollowingPage> {
            self.requests
                .lock()
                .unwrap()
                .push((page_size, pagination_token.map(String::from)));

            let start: u64 = pagination_token.map_or(0, |t| t.parse().unwrap());
            let end = (start + page_size as u64).min(self.edges);
            Ok(FollowingPage {
                ids: (start..end).map(AccountId).collect(),
                next_token: (end < self.edges).then(|| end.to_string()),
            })
        }

        async fn users_by_ids(&self, _ids: &[AccountId]) -> crate::Result<Vec<Account>> {
            Ok(Vec::new())
        }

        async fn users_by_usernames(&self, _usernames: &[String]) -> crate::Result<Vec<Account>> {
            Ok(Vec::new())
        }
    }

    fn fast_limits() -> FetchLimits {
        FetchLimits {
            item_delay: Duration::ZERO,
            ..FetchLimits::default()
        }
    }

    #[tokio::test]
    async fn test_cap_applies_to_large_accounts() {
        let source = PagedSource::new(12_000);
        let ids = fetch_following(&source, AccountId(1), &fast_limits())
            .await
            .unwrap();

        assert_eq!(ids.len(), 5000);
        assert_eq!(ids.first(), Some(&AccountId(0)));
        assert_eq!(ids.last(), Some(&AccountId(4999)));
        // Five full pages, no sixth request.
        assert_eq!(source.requests.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_follows_cursor_to_last_page() {
        let source = PagedSource::new(2_500);
        let ids = fetch_following(&source, AccountId(1), &fast_limits())
            .await
            .unwrap();

        assert_eq!(ids.len(), 2_500);
        let requests = source.requests.lock().unwrap();
        let tokens: Vec<_> = requests.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(
            tokens,
            vec![None, Some("1000".to_string()), Some("2000".to_string())]
        );
    }

    #[tokio::test]
    async fn test_page_order_preserved() {
        let source = PagedSource::new(30);
        let limits = FetchLimits {
            page_size: 7,
            ..fast_limits()
        };
        let ids = fetch_following(&source, AccountId(1), &limits).await.unwrap();
        let expected: Vec<_> = (0..30).map(AccountId).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_page_size_clamped() {
        let source = PagedSource::new(10);
        let limits = FetchLimits {
            page_size: 50_000,
            ..fast_limits()
        };
        fetch_following(&source, AccountId(1), &limits).await.unwrap();
        assert_eq!(source.requests.lock().unwrap()[0].0, 1000);
    }

    #[tokio::test]
    async fn test_account_with_no_follows() {
        let source = PagedSource::new(0);
        let ids = fetch_following(&source, AccountId(1), &fast_limits())
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_item_delay_paces_emission() {
        let source = PagedSource::new(5);
        let limits = FetchLimits {
            item_delay: Duration::from_millis(10),
            ..FetchLimits::default()
        };
        let start = tokio::time::Instant::now();
        fetch_following(&source, AccountId(1), &limits).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
