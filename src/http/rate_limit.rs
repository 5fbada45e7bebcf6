//! Client-side request throttle
//!
//! A governor token bucket applied before every request so a run stays
//! under the organization's quota instead of relying on 429 handling alone.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Throttle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Sustained request rate
    pub requests_per_second: u32,
    /// Requests allowed back-to-back
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

impl ThrottleConfig {
    /// Create a throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket shared by clones of a client
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Build a throttle; zero values are raised to one
    pub fn new(config: &ThrottleConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait for a permit
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod throttle_tests {
    use super::*;

    #[test]
    fn test_burst_then_exhausted() {
        let throttle = Throttle::new(&ThrottleConfig::new(1, 3));
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let throttle = Throttle::new(&ThrottleConfig::new(0, 0));
        assert!(throttle.try_acquire());
    }

    #[test]
    fn test_config_default_burst() {
        let config: ThrottleConfig = serde_json::from_str(r#"{"requests_per_second": 5}"#).unwrap();
        assert_eq!(config.burst_size, 1);
    }

    #[tokio::test]
    async fn test_acquire_within_burst() {
        let throttle = Throttle::new(&ThrottleConfig::new(100, 10));
        throttle.acquire().await;
    }
}
