//! Core domain types for ego network expansion.
//!
//! These types describe accounts in the remote social graph and the
//! adjacency records produced by one-hop expansion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Accounts ──────────────────────────────────────────────────────

/// Opaque numeric identity of one account in the remote graph.
///
/// The remote API transports it as a decimal string; persisted run files
/// store it as a plain integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Profile details returned by account lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl Account {
    /// Render as `name:username`.
    pub fn describe(&self) -> String {
        format!("{}:{}", self.name, self.username)
    }
}

// ── Adjacency ─────────────────────────────────────────────────────

/// One account's outbound edges as fetched in a single run.
///
/// `following` keeps the order the API paginated it in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjacencyRecord {
    pub user: AccountId,
    pub following: Vec<AccountId>,
}

impl AdjacencyRecord {
    pub fn new(user: AccountId, following: Vec<AccountId>) -> Self {
        Self { user, following }
    }

    pub fn len(&self) -> usize {
        self.following.len()
    }

    pub fn is_empty(&self) -> bool {
        self.following.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_parses_decimal_strings() {
        assert_eq!("2244994945".parse::<AccountId>().unwrap(), AccountId(2244994945));
        assert_eq!(" 42 ".parse::<AccountId>().unwrap(), AccountId(42));
        assert!("abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn account_id_serializes_as_integer() {
        let json = serde_json::to_string(&AccountId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn account_describe() {
        let account = Account {
            id: AccountId(1),
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            profile_image_url: None,
        };
        assert_eq!(account.describe(), "Ada Lovelace:ada");
    }

    #[test]
    fn record_roundtrip_keeps_order() {
        let record = AdjacencyRecord::new(AccountId(1), vec![AccountId(9), AccountId(3)]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"user":1,"following":[9,3]}"#);
        let back: AdjacencyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
