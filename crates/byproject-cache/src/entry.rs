//! Cache entries.

use std::time::Duration;

use tokio::time::Instant;

/// Smallest lifetime an entry can have.
const MIN_TTL: Duration = Duration::from_millis(1);

/// A value together with its lifetime.
///
/// Invariant: `expires_at > created_at`. An entry is live strictly before
/// `expires_at`; from that instant on it behaves exactly like a missing one.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    key: String,
    value: V,
    created_at: Instant,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Creates an entry that starts now and lives for `ttl`.
    pub fn new(key: impl Into<String>, value: V, ttl: Duration) -> Self {
        let created_at = Instant::now();
        Self::with_times(key, value, created_at, created_at + ttl.max(MIN_TTL))
    }

    /// Creates an entry with explicit instants.
    ///
    /// `expires_at` is pushed forward when it does not come after
    /// `created_at`.
    pub fn with_times(
        key: impl Into<String>,
        value: V,
        created_at: Instant,
        expires_at: Instant,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            created_at,
            expires_at: expires_at.max(created_at + MIN_TTL),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns true if the entry has not expired at `now`.
    pub fn is_live_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Returns true if the entry has not expired yet.
    pub fn is_live(&self) -> bool {
        self.is_live_at(Instant::now())
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_ttl(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Time elapsed since the value was produced.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_boundary() {
        let entry = CacheEntry::new("k", 1u32, Duration::from_secs(10));

        tokio::time::advance(Duration::from_millis(9_999)).await;
        assert!(entry.is_live());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!entry.is_live());
        assert_eq!(entry.remaining_ttl(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_keeps_invariant() {
        let entry = CacheEntry::new("k", (), Duration::ZERO);
        assert!(entry.expires_at() > entry.created_at());
    }

    #[tokio::test(start_paused = true)]
    async fn test_age_tracks_elapsed_time() {
        let entry = CacheEntry::new("k", "v", Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(15)).await;

        assert_eq!(entry.age(), Duration::from_secs(15));
        assert_eq!(entry.remaining_ttl(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_times_pushes_expiry_forward() {
        let now = Instant::now();
        let entry = CacheEntry::with_times("k", 0u8, now, now - Duration::from_secs(5));
        assert!(entry.expires_at() > entry.created_at());
    }
}
