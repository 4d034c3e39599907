//! HTTP implementation of [`GraphApi`] against the v2 REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ego_core::{Account, AccountId};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::{GraphApi, MAX_LOOKUP_BATCH, MAX_PAGE_SIZE};
use crate::error::{ClientError, Result};
use crate::ratelimit::{reset_delay, with_rate_limit_retry, RateLimitGate, RESET_HEADER};
use crate::types::{ApiProblem, FollowingPage, UserResponse, UsersResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

const USER_FIELDS: &str = "profile_image_url,username";

/// Configuration for connecting to the remote graph API.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub bearer_token: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bearer_token: bearer_token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Thread-safe API client with a shared rate-limit gate.
///
/// Construct once per process and share it; clones reuse the same
/// connection pool and the same rate-limit state.
#[derive(Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: Url,
    bearer_token: String,
    gate: RateLimitGate,
}

impl TwitterClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Parse(format!("invalid base url {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Parse(format!(
                "base url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        tracing::info!(base_url = %base_url, "Graph API client ready");
        Ok(Self {
            http,
            base_url,
            bearer_token: config.bearer_token.clone(),
            gate: RateLimitGate::new(),
        })
    }

    /// The rate-limit state shared by every clone of this client.
    pub fn rate_limit_gate(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Base URL extended by `segments`, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON document, waiting out rate limits.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(segments);
        with_rate_limit_retry(&self.gate, || self.get_once(&url, query)).await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .http
            .get(url.clone())
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = resp
                .headers()
                .get(RESET_HEADER)
                .and_then(|v| v.to_str().ok());
            return Err(ClientError::RateLimited {
                retry_after: reset_delay(reset, Utc::now()),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl GraphApi for TwitterClient {
    async fn user_by_username(&self, username: &str) -> Result<Account> {
        let resp: UserResponse = self
            .get_json(&["2", "users", "by", "username", username], &[])
            .await?;

        match resp.data {
            Some(user) => user.into_account(),
            None => Err(ClientError::unavailable(username, first_reason(&resp.errors))),
        }
    }

    async fn following_page(
        &self,
        account: AccountId,
        page_size: u32,
        pagination_token: Option<&str>,
    ) -> Result<FollowingPage> {
        let mut query = vec![("max_results", page_size.clamp(1, MAX_PAGE_SIZE).to_string())];
        if let Some(token) = pagination_token {
            query.push(("pagination_token", token.to_string()));
        }

        let id = account.to_string();
        let resp: UsersResponse = self
            .get_json(&["2", "users", &id, "following"], &query)
            .await?;
        FollowingPage::from_response(account, resp)
    }

    async fn users_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>> {
        let mut accounts = Vec::with_capacity(ids.len());
        for batch in ids.chunks(MAX_LOOKUP_BATCH) {
            let joined = batch.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
            let query = [("ids", joined), ("user.fields", USER_FIELDS.to_string())];

            let resp: UsersResponse = self.get_json(&["2", "users"], &query).await?;
            accounts.extend(collect_accounts(resp)?);
        }
        Ok(accounts)
    }

    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<Account>> {
        let mut accounts = Vec::with_capacity(usernames.len());
        for batch in usernames.chunks(MAX_LOOKUP_BATCH) {
            let query = [("usernames", batch.join(",")), ("user.fields", USER_FIELDS.to_string())];

            let resp: UsersResponse = self.get_json(&["2", "users", "by"], &query).await?;
            accounts.extend(collect_accounts(resp)?);
        }
        Ok(accounts)
    }
}

/// Keep the accounts that resolved; log the ones that did not.
fn collect_accounts(resp: UsersResponse) -> Result<Vec<Account>> {
    for problem in &resp.errors {
        tracing::warn!(
            value = problem.value.as_deref().unwrap_or(""),
            reason = %problem.reason(),
            "Account lookup returned an error"
        );
    }
    resp.data
        .unwrap_or_default()
        .into_iter()
        .map(|u| u.into_account())
        .collect()
}

fn first_reason(problems: &[ApiProblem]) -> String {
    problems
        .first()
        .map(ApiProblem::reason)
        .unwrap_or_else(|| "empty response".to_string())
}
