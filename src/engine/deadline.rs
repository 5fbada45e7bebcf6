//! Cooperative deadline

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Wall-clock limit for one invocation.
///
/// Workers pass every network call through [`Deadline::run`]; once the limit
/// passes no new call is started and the worker reports progress instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at: Option<DateTime<Utc>>,
}

impl Deadline {
    /// Deadline at a fixed instant
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { at: Some(at) }
    }

    /// Deadline `duration` from now
    pub fn after(duration: Duration) -> Self {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        Self::at(Utc::now().checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// No deadline
    pub fn unbounded() -> Self {
        Self { at: None }
    }

    /// Instant of the deadline, if any
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.at
    }

    /// Time left; `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        let at = self.at?;
        Some((at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }

    /// Check whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Run `future` unless the deadline passes first; `None` means it expired
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        match self.remaining() {
            None => Some(future.await),
            Some(left) if left.is_zero() => None,
            Some(left) => tokio::time::timeout(left, future).await.ok(),
        }
    }
}

impl From<Option<DateTime<Utc>>> for Deadline {
    fn from(at: Option<DateTime<Utc>>) -> Self {
        Self { at }
    }
}
