//! Credential loading for the remote graph API.
//!
//! Credentials are read from `TWITTER_*` environment variables, after a
//! `.env` file in the working directory (if any) has been loaded into the
//! process environment.

use std::fmt;

use serde::Deserialize;

use crate::error::{EgoError, Result};

/// Environment prefix for all credential variables.
pub const CREDENTIALS_PREFIX: &str = "TWITTER";

/// API credentials and the seed account handle.
#[derive(Clone)]
pub struct Credentials {
    /// Handle of the seed account whose following list is expanded.
    pub username: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Required: every API call is bearer-authenticated.
    pub bearer_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    username: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    api_bearer_token: Option<String>,
}

impl Credentials {
    /// Load `.env`, then read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(config::Environment::with_prefix(CREDENTIALS_PREFIX))
    }

    /// Read credentials from an explicit environment source.
    pub fn from_source(env: config::Environment) -> Result<Self> {
        let raw: RawCredentials = config::Config::builder()
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EgoError::Config(e.to_string()))?;

        let bearer_token = non_empty(raw.api_bearer_token).ok_or_else(|| {
            EgoError::Config(format!("{CREDENTIALS_PREFIX}_API_BEARER_TOKEN is not set"))
        })?;
        let username = non_empty(raw.username).ok_or_else(|| {
            EgoError::Config(format!("{CREDENTIALS_PREFIX}_USERNAME is not set"))
        })?;

        let credentials = Self {
            username,
            api_key: non_empty(raw.api_key),
            api_secret: non_empty(raw.api_secret),
            bearer_token,
        };
        tracing::debug!(credentials = ?credentials, "Loaded API credentials");
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("api_secret", &self.api_secret.as_deref().map(redact))
            .field("bearer_token", &redact(&self.bearer_token))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn redact(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    format!("{shown}***")
}
