//! Cache tuning.

use std::time::Duration;

use crate::health::DEFAULT_ALERT_THRESHOLD;

/// Settings of one cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Lifetime of values fetched from upstream (default: 1 hour).
    pub ttl: Duration,
    /// Lifetime of the fallback value (default: 5 minutes).
    pub fallback_ttl: Duration,
    /// Upper bound on a single upstream fetch (default: 30 seconds).
    pub fetch_timeout: Duration,
    /// Maximum number of local entries (default: 10000).
    pub max_capacity: u64,
    /// Consecutive fallbacks before the source is reported degraded.
    pub fallback_alert_threshold: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            fallback_ttl: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(30),
            max_capacity: 10_000,
            fallback_alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

impl CacheSettings {
    /// Defaults for the translation cache: entries live for a day.
    pub fn translations() -> Self {
        Self {
            ttl: Duration::from_secs(86_400),
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fallback_ttl(mut self, fallback_ttl: Duration) -> Self {
        self.fallback_ttl = fallback_ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: u32) -> Self {
        self.fallback_alert_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();
        assert_eq!(settings.ttl, Duration::from_secs(3600));
        assert_eq!(settings.fallback_ttl, Duration::from_secs(300));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_capacity, 10_000);
        assert_eq!(settings.fallback_alert_threshold, 12);
    }

    #[test]
    fn test_translation_defaults() {
        let settings = CacheSettings::translations();
        assert_eq!(settings.ttl, Duration::from_secs(86_400));
        assert_eq!(settings.fallback_ttl, Duration::from_secs(300));
    }
}
