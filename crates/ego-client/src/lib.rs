//! ego-client: access to the remote social graph API.
//!
//! [`GraphApi`] is the seam the expansion engine talks to. [`TwitterClient`]
//! implements it over HTTP with bearer auth and a process-wide rate-limit
//! gate; [`fetch_following`] pages through one account's following list
//! under a result cap.

pub mod api;
pub mod client;
pub mod error;
pub mod lookup;
pub mod paginate;
pub mod ratelimit;
pub mod types;

pub use api::GraphApi;
pub use client::{ClientConfig, TwitterClient};
pub use error::{ClientError, Result};
pub use paginate::{fetch_following, FetchLimits};
pub use types::FollowingPage;
