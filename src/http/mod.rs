//! HTTP transport for the Sentry API
//!
//! # Features
//!
//! - **Retries**: 429/503 responses retried per [`RetryPolicy`]
//! - **Rate-limit signals**: `Retry-After` and reset headers honoured before backoff
//! - **Throttling**: optional governor token bucket in front of every request
//! - **Cursor paging**: list endpoints return a [`Page`](crate::pagination::Page)

mod client;
mod rate_limit;
mod retry;

pub use client::SentryClient;
pub use rate_limit::{Throttle, ThrottleConfig};
pub use retry::{RateLimitSignals, RetryContext, RetryPolicy, RATE_LIMIT_RESET_HEADERS};
