//! Upstream health tracking.

use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::Instant;

/// Default number of consecutive fallbacks before the source is degraded.
pub const DEFAULT_ALERT_THRESHOLD: u32 = 12;

/// Tracks the outcome of upstream fetches for one cache.
///
/// A fetch that falls back to the default value counts as a failure; the
/// streak is reset by the next successful fetch.
#[derive(Debug)]
pub struct SourceHealth {
    /// The last successful fetch time.
    last_success: RwLock<Option<Instant>>,
    /// The last error message, if any.
    last_error: RwLock<Option<String>>,
    /// Number of consecutive failures.
    failure_streak: RwLock<u32>,
    /// Streak length at which the source is reported degraded.
    alert_threshold: u32,
}

/// Serializable view of a [`SourceHealth`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub degraded: bool,
    pub failure_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_since_success: Option<u64>,
}

impl SourceHealth {
    /// Creates a tracker that degrades after `alert_threshold` failures.
    pub fn new(alert_threshold: u32) -> Self {
        Self {
            last_success: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_streak: RwLock::new(0),
            alert_threshold: alert_threshold.max(1),
        }
    }

    /// Records a successful fetch.
    pub fn record_success(&self) {
        let mut last_success = self.last_success.write();
        let mut last_error = self.last_error.write();
        let mut failure_streak = self.failure_streak.write();

        *last_success = Some(Instant::now());
        *last_error = None;
        *failure_streak = 0;
    }

    /// Records a failed fetch and returns the new streak length.
    pub fn record_failure(&self, error: impl Into<String>) -> u32 {
        let mut last_error = self.last_error.write();
        let mut failure_streak = self.failure_streak.write();

        *last_error = Some(error.into());
        *failure_streak += 1;
        *failure_streak
    }

    /// Returns the number of consecutive failures.
    pub fn failure_streak(&self) -> u32 {
        *self.failure_streak.read()
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns the duration since the last successful fetch.
    pub fn time_since_success(&self) -> Option<Duration> {
        self.last_success.read().map(|t| t.elapsed())
    }

    /// Returns true while the last fetch failed.
    pub fn is_failing(&self) -> bool {
        self.failure_streak() > 0
    }

    /// Returns true once the streak has reached the alert threshold.
    pub fn is_degraded(&self) -> bool {
        self.failure_streak() >= self.alert_threshold
    }

    pub fn alert_threshold(&self) -> u32 {
        self.alert_threshold
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            degraded: self.is_degraded(),
            failure_streak: self.failure_streak(),
            last_error: self.last_error(),
            seconds_since_success: self.time_since_success().map(|d| d.as_secs()),
        }
    }
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}
