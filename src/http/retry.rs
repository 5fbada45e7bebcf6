//! Rate-limit aware retry policy
//!
//! Only 429 and 503 responses are retried. The delay before the next
//! attempt is chosen, in order, from:
//!
//! 1. `Retry-After: N` (seconds) → `N * 1000` ms
//! 2. a reset timestamp header (unix seconds) → time until reset, honoured
//!    only when it falls within `(0, max_reset_wait_ms]`
//! 3. exponential backoff → `base_delay_ms * 2^(attempt - 1)`
//!
//! Malformed or missing headers fall through to the next tier.

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Headers carrying a reset time as unix seconds, checked in order
pub const RATE_LIMIT_RESET_HEADERS: [&str; 2] = ["x-ratelimit-reset", "x-sentry-rate-limit-reset"];

/// Retry bounds and delays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff
    pub base_delay_ms: u64,
    /// Longest reset wait that is honoured
    pub max_reset_wait_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_reset_wait_ms: 300_000,
        }
    }
}

/// Rate-limit hints taken from a throttled response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitSignals {
    /// Raw `Retry-After` value
    pub retry_after: Option<String>,
    /// Raw reset timestamp value
    pub reset_at: Option<String>,
}

impl RateLimitSignals {
    /// Collect signals from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            retry_after: header("retry-after"),
            reset_at: RATE_LIMIT_RESET_HEADERS.iter().find_map(|name| header(*name)),
        }
    }

    /// Signals carried by a rate-limited error
    pub fn from_error(error: &Error) -> Option<Self> {
        match error {
            Error::RateLimited {
                retry_after,
                reset_at,
                ..
            } => Some(Self {
                retry_after: retry_after.clone(),
                reset_at: reset_at.clone(),
            }),
            _ => None,
        }
    }

    /// `Retry-After` in milliseconds, if numeric
    pub fn retry_after_ms(&self) -> Option<u64> {
        let seconds: u64 = self.retry_after.as_deref()?.trim().parse().ok()?;
        Some(seconds.saturating_mul(1000))
    }

    /// Milliseconds until the advertised reset, if within `(0, window_ms]`
    pub fn reset_wait_ms(&self, now_ms: i64, window_ms: u64) -> Option<u64> {
        let reset_secs: i64 = self.reset_at.as_deref()?.trim().parse().ok()?;
        let wait = reset_secs.saturating_mul(1000).saturating_sub(now_ms).max(0) as u64;
        (wait > 0 && wait <= window_ms).then_some(wait)
    }
}

/// Per-call retry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// Attempt currently in flight (1-based)
    pub attempt: u32,
    /// Total attempts allowed
    pub max_attempts: u32,
    /// Delay slept before the current attempt
    pub last_delay_ms: u64,
}

impl RetryContext {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            last_delay_ms: 0,
        }
    }

    fn is_last_attempt(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            ..Self::default()
        }
    }

    /// Exponential backoff for a 1-based attempt number
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(63);
        self.base_delay_ms.saturating_mul(1u64 << exponent)
    }

    /// Delay before retrying after `attempt` failed with the given signals
    pub fn delay_ms(&self, signals: &RateLimitSignals, attempt: u32, now_ms: i64) -> u64 {
        if let Some(ms) = signals.retry_after_ms() {
            debug!("Retry-After header suggests {ms}ms");
            return ms;
        }

        if let Some(ms) = signals.reset_wait_ms(now_ms, self.max_reset_wait_ms) {
            debug!("Rate limit resets in {ms}ms");
            return ms;
        }

        self.backoff_ms(attempt)
    }

    /// Run `request` until it succeeds, fails with a non rate-limit error,
    /// or the attempt bound is reached. The last error is returned as-is.
    pub async fn execute<T, F, Fut>(&self, mut request: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut ctx = RetryContext::new(self.max_attempts.max(1));

        loop {
            ctx.attempt += 1;

            let error = match request().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let Some(signals) = RateLimitSignals::from_error(&error) else {
                return Err(error);
            };

            if ctx.is_last_attempt() {
                warn!(
                    "Rate limit exceeded, max attempts ({}) reached",
                    ctx.max_attempts
                );
                return Err(error);
            }

            let now_ms = chrono::Utc::now().timestamp_millis();
            ctx.last_delay_ms = self.delay_ms(&signals, ctx.attempt, now_ms);
            warn!(
                "Rate limited ({}), retrying in {}ms (attempt {}/{})",
                error.status().unwrap_or_default(),
                ctx.last_delay_ms,
                ctx.attempt,
                ctx.max_attempts
            );
            tokio::time::sleep(Duration::from_millis(ctx.last_delay_ms)).await;
        }
    }
}
