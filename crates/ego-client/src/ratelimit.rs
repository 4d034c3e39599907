//! Process-wide rate-limit state.
//!
//! The remote API answers 429 once a window's budget is spent and reports
//! the window reset as epoch seconds in `x-rate-limit-reset`. Every request
//! waits on one shared [`RateLimitGate`]; a 429 closes the gate until the
//! reset, so all workers back off together instead of hammering the API.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::error::{ClientError, Result};

/// Response header carrying the window reset as epoch seconds.
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Wait used when a 429 carries no usable reset header (one API window).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Added to every computed wait so requests land after the reset.
const RESET_SLACK: Duration = Duration::from_secs(1);

/// Shared "do not send before" instant. Clone is cheap (inner Arc).
#[derive(Debug, Clone, Default)]
pub struct RateLimitGate {
    blocked_until: Arc<Mutex<Option<Instant>>>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the gate is open. Re-checks after sleeping because another
    /// worker may have pushed the deadline out in the meantime.
    pub async fn wait_ready(&self) {
        loop {
            let until = *self.blocked_until.lock().await;
            match until {
                Some(deadline) if deadline > Instant::now() => sleep_until(deadline).await,
                _ => return,
            }
        }
    }

    /// Close the gate for `delay`. Never shortens an existing deadline.
    pub async fn block_for(&self, delay: Duration) {
        let deadline = Instant::now() + delay;
        let mut guard = self.blocked_until.lock().await;
        if guard.map_or(true, |current| current < deadline) {
            *guard = Some(deadline);
        }
    }

    /// Current deadline, if the gate has ever been closed.
    pub async fn blocked_until(&self) -> Option<Instant> {
        *self.blocked_until.lock().await
    }
}

/// Turn an `x-rate-limit-reset` header value into a wait duration.
pub fn reset_delay(header: Option<&str>, now: DateTime<Utc>) -> Duration {
    let Some(reset) = header.and_then(|h| h.trim().parse::<i64>().ok()) else {
        return DEFAULT_WINDOW;
    };
    let remaining = reset - now.timestamp();
    if remaining <= 0 {
        return RESET_SLACK;
    }
    Duration::from_secs(remaining as u64) + RESET_SLACK
}

/// Run `op` until it returns something other than [`ClientError::RateLimited`],
/// waiting on the shared gate before every attempt.
pub async fn with_rate_limit_retry<T, F, Fut>(gate: &RateLimitGate, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        gate.wait_ready().await;
        match op().await {
            Err(ClientError::RateLimited { retry_after }) => {
                tracing::warn!(
                    retry_after_secs = retry_after.as_secs(),
                    "Rate limit reached, waiting for window reset"
                );
                gate.block_for(retry_after).await;
            }
            other => return other,
        }
    }
}
