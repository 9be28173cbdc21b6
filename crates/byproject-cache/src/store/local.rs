//! In-process store backed by Moka.

use std::time::Duration;

use async_trait::async_trait;
use glob::Pattern;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;

use super::CacheStore;
use crate::entry::CacheEntry;
use crate::error::StoreError;
use crate::metrics::CacheMetrics;

/// Expires each Moka entry with the TTL carried by the entry itself.
struct EntryExpiry;

impl<V> Expiry<String, CacheEntry<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.remaining_ttl())
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.remaining_ttl())
    }
}

/// Metric label for removals that are real evictions. Overwrites and
/// invalidations return `None`.
fn eviction_reason(cause: RemovalCause) -> Option<&'static str> {
    match cause {
        RemovalCause::Expired => Some("ttl"),
        RemovalCause::Size => Some("capacity"),
        RemovalCause::Explicit | RemovalCause::Replaced => None,
    }
}

/// Local tier, always present.
///
/// Moka evicts on its own clock; reads additionally check the entry's own
/// expiry so an expired entry is never returned, even before Moka has
/// collected it.
#[derive(Clone)]
pub struct LocalStore<V> {
    inner: Cache<String, CacheEntry<V>>,
    metrics: CacheMetrics,
}

impl<V> LocalStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a store holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64, metrics: CacheMetrics) -> Self {
        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _value, cause| {
                if let Some(reason) = eviction_reason(cause) {
                    eviction_metrics.record_eviction(reason);
                }
            })
            .build();

        Self { inner, metrics }
    }

    /// Returns the live entry for `key`, dropping it if it has expired.
    pub async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.inner.get(key).await?;
        if entry.is_live() {
            Some(entry)
        } else {
            self.inner.invalidate(key).await;
            None
        }
    }

    /// Stores an entry as is, keeping its timestamps.
    pub async fn put(&self, entry: CacheEntry<V>) {
        self.inner.insert(entry.key().to_string(), entry).await;
        self.metrics.update_entry_count(self.inner.entry_count());
    }

    pub async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Keys currently held that match the pattern, live or not.
    pub fn keys_matching(&self, pattern: &Pattern) -> Vec<String> {
        self.inner
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = tokio::time::Instant::now();
        let expired: Vec<String> = self
            .inner
            .iter()
            .filter(|(_, entry)| !entry.is_live_at(now))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &expired {
            self.inner.invalidate(key).await;
        }
        self.inner.run_pending_tasks().await;
        self.metrics.update_entry_count(self.inner.entry_count());

        expired.len()
    }

    /// Approximate number of entries, expired ones included until collected.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flushes Moka's pending maintenance so counts are exact.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl<V> CacheStore<V> for LocalStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &str) -> Result<Option<CacheEntry<V>>, StoreError> {
        Ok(self.get(key).await)
    }

    async fn write(&self, key: &str, value: &V, ttl: Duration) -> Result<(), StoreError> {
        self.put(CacheEntry::new(key, value.clone(), ttl)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.remove(key).await;
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize, StoreError> {
        let pattern = Pattern::new(pattern).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        let keys = self.keys_matching(&pattern);
        for key in &keys {
            self.inner.invalidate(key).await;
        }
        Ok(keys.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
