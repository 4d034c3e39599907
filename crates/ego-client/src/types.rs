//! Wire types for the remote graph API (v2 JSON envelopes).

use ego_core::{Account, AccountId};
use serde::Deserialize;

use crate::error::{ClientError, Result};

/// A user object as returned by the API. Ids arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl ApiUser {
    pub fn account_id(&self) -> Result<AccountId> {
        self.id
            .parse()
            .map_err(|_| ClientError::Parse(format!("invalid account id: {:?}", self.id)))
    }

    pub fn into_account(self) -> Result<Account> {
        let id = self.account_id()?;
        Ok(Account {
            id,
            name: self.name,
            username: self.username,
            profile_image_url: self.profile_image_url,
        })
    }
}

/// Entry of the `errors` array. Returned alongside (or instead of) `data`
/// for deleted, suspended, or protected accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProblem {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub value: Option<String>,
}

impl ApiProblem {
    pub fn reason(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Envelope for single-user endpoints.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub data: Option<ApiUser>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

/// Envelope for multi-user endpoints, including paginated following lists.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub data: Option<Vec<ApiUser>>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    pub result_count: Option<u32>,
    pub next_token: Option<String>,
}

/// One page of an account's following list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowingPage {
    pub ids: Vec<AccountId>,
    /// Continuation cursor; `None` on the last page.
    pub next_token: Option<String>,
}

impl FollowingPage {
    /// Convert a following-list envelope for `account`.
    ///
    /// An envelope with problems and no data means the account itself could
    /// not be read. An account that follows nobody comes back with neither.
    pub fn from_response(account: AccountId, resp: UsersResponse) -> Result<Self> {
        let users = match resp.data {
            Some(users) => users,
            None => match resp.errors.first() {
                Some(problem) => {
                    return Err(ClientError::unavailable(account, problem.reason()));
                }
                None => Vec::new(),
            },
        };

        let ids = users
            .iter()
            .map(ApiUser::account_id)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ids,
            next_token: resp.meta.and_then(|m| m.next_token),
        })
    }
}
