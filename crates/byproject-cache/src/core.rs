//! The cache core: tiered lookup, coordinated fetch, fallback.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::CacheSettings;
use crate::coordinator::{FetchCoordinator, FetchRole};
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::health::SourceHealth;
use crate::metrics::{CacheMetrics, HitTier};
use crate::store::{CacheStore, LocalStore, StorageType};

/// Point-in-time statistics of one cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub name: &'static str,
    pub entries: u64,
    pub storage: StorageType,
    pub remote_configured: bool,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub fallbacks: u64,
    pub coalesced: u64,
    pub write_failures: u64,
    pub in_flight: usize,
}

pub(crate) struct CoreInner<V> {
    pub(crate) name: &'static str,
    pub(crate) local: LocalStore<V>,
    pub(crate) remote: Option<Arc<dyn CacheStore<V>>>,
    coordinator: FetchCoordinator<V>,
    fallback: Option<V>,
    settings: CacheSettings,
    health: SourceHealth,
    metrics: CacheMetrics,
}

/// A coalescing TTL cache over a local store and an optional remote one.
///
/// Reads go local, then remote, then upstream. Upstream fetches are
/// coordinated so that at most one runs per key, bounded by the fetch
/// timeout. When a fetch fails the fallback value, if any, is served and
/// kept for the short fallback TTL.
///
/// Cloning is cheap: clones share all state.
pub struct CacheCore<V> {
    pub(crate) inner: Arc<CoreInner<V>>,
}

impl<V> Clone for CacheCore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`CacheCore`].
pub struct CacheCoreBuilder<V> {
    name: &'static str,
    settings: CacheSettings,
    remote: Option<Arc<dyn CacheStore<V>>>,
    fallback: Option<V>,
}

impl<V> CacheCoreBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn settings(mut self, settings: CacheSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds a shared remote tier.
    pub fn remote(mut self, store: Arc<dyn CacheStore<V>>) -> Self {
        self.remote = Some(store);
        self
    }

    /// Adds an optional remote tier.
    pub fn remote_opt(mut self, store: Option<Arc<dyn CacheStore<V>>>) -> Self {
        self.remote = store;
        self
    }

    /// Value served when an upstream fetch fails.
    pub fn fallback(mut self, value: V) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn build(self) -> CacheCore<V> {
        let metrics = CacheMetrics::new(self.name);
        let local = LocalStore::new(self.settings.max_capacity, metrics.clone());

        match &self.remote {
            Some(store) => info!(cache = self.name, backend = store.name(), "Remote store enabled"),
            None => info!(cache = self.name, "No remote store configured, running local-only"),
        }

        CacheCore {
            inner: Arc::new(CoreInner {
                name: self.name,
                local,
                remote: self.remote,
                coordinator: FetchCoordinator::new(),
                fallback: self.fallback,
                health: SourceHealth::new(self.settings.fallback_alert_threshold),
                settings: self.settings,
                metrics,
            }),
        }
    }
}

impl<V> CacheCore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Starts building a cache named `name` (used in logs and metrics).
    pub fn builder(name: &'static str) -> CacheCoreBuilder<V> {
        CacheCoreBuilder {
            name,
            settings: CacheSettings::default(),
            remote: None,
            fallback: None,
        }
    }

    /// Returns the cached value for `key`, fetching it on a miss.
    ///
    /// Concurrent calls for the same cold key run `fetch` once and all
    /// receive its outcome. Fails only when the fetch fails (or times out)
    /// and no fallback is defined.
    pub async fn get<F, Fut, E>(&self, key: &str, fetch: F, ttl: Duration) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let start = Instant::now();
        let inner = &self.inner;

        if let Some(entry) = self.lookup(key).await {
            inner.metrics.record_operation_duration("get_hit", start.elapsed());
            return Ok(entry.into_value());
        }

        inner.metrics.record_miss();
        debug!(cache = inner.name, key = %key, "Cache miss");

        let task_inner = Arc::clone(inner);
        let task_key = key.to_string();
        let (result, role) = inner
            .coordinator
            .run(key, async move { task_inner.fetch_and_store(task_key, fetch, ttl).await })
            .await;

        if role == FetchRole::Follower {
            inner.metrics.record_coalesced();
        }
        inner
            .metrics
            .record_operation_duration("get_miss", start.elapsed());

        result
    }

    /// Reads a live entry from the tiers without fetching.
    ///
    /// A remote hit is mirrored into the local store with its remaining
    /// lifetime.
    pub async fn lookup(&self, key: &str) -> Option<CacheEntry<V>> {
        let inner = &self.inner;

        if let Some(entry) = inner.local.get(key).await {
            inner.metrics.record_hit(HitTier::Local);
            debug!(cache = inner.name, key = %key, tier = "local", "Cache hit");
            return Some(entry);
        }

        let remote = inner.remote.as_ref()?;
        match remote.read(key).await {
            Ok(Some(entry)) if entry.is_live() => {
                inner.local.put(entry.clone()).await;
                inner.metrics.record_hit(HitTier::Remote);
                debug!(cache = inner.name, key = %key, tier = "remote", "Cache hit");
                Some(entry)
            },
            Ok(_) => None,
            Err(e) => {
                warn!(
                    cache = inner.name,
                    key = %key,
                    backend = remote.name(),
                    error = %e,
                    "Remote read failed, treating as miss"
                );
                None
            },
        }
    }

    /// Removes `key` from every tier. Removing a missing key is a no-op.
    pub async fn invalidate(&self, key: &str) {
        let inner = &self.inner;
        inner.local.remove(key).await;

        if let Some(remote) = &inner.remote {
            if let Err(e) = remote.delete(key).await {
                warn!(
                    cache = inner.name,
                    key = %key,
                    backend = remote.name(),
                    error = %e,
                    "Remote delete failed"
                );
            }
        }

        debug!(cache = inner.name, key = %key, "Cache entry invalidated");
    }

    /// Invalidates `key` and fetches it again.
    pub async fn refresh<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
        ttl: Duration,
    ) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.invalidate(key).await;
        self.get(key, fetch, ttl).await
    }

    /// Returns true if the local store holds a live entry for `key`.
    pub async fn is_live(&self, key: &str) -> bool {
        self.inner.local.get(key).await.is_some()
    }

    /// Returns the live local entry for `key`, without touching metrics.
    pub async fn entry(&self, key: &str) -> Option<CacheEntry<V>> {
        self.inner.local.get(key).await
    }

    /// Drops expired local entries and returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let removed = self.inner.local.cleanup_expired().await;
        if removed > 0 {
            debug!(cache = self.inner.name, removed, "Expired entries cleaned up");
        }
        removed
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.inner.settings
    }

    pub fn health(&self) -> &SourceHealth {
        &self.inner.health
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.inner.metrics
    }

    pub fn storage_type(&self) -> StorageType {
        if self.inner.remote.is_some() {
            StorageType::Redis
        } else {
            StorageType::Memory
        }
    }

    pub fn stats(&self) -> CacheStats {
        let inner = &self.inner;
        CacheStats {
            name: inner.name,
            entries: inner.local.entry_count(),
            storage: self.storage_type(),
            remote_configured: inner.remote.is_some(),
            hits: inner.metrics.hits(),
            misses: inner.metrics.misses(),
            hit_rate: inner.metrics.hit_rate(),
            fallbacks: inner.metrics.fallbacks(),
            coalesced: inner.metrics.coalesced(),
            write_failures: inner.metrics.write_failures(),
            in_flight: inner.coordinator.in_flight_count(),
        }
    }

    /// Flushes pending local maintenance. Mostly useful in tests.
    pub async fn sync(&self) {
        self.inner.local.sync().await;
    }
}

impl<V> CoreInner<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Body of a coordinated fetch. Runs on the leader's task.
    async fn fetch_and_store<F, Fut, E>(
        self: Arc<Self>,
        key: String,
        fetch: F,
        ttl: Duration,
    ) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        // A fetch that settled between our miss and this point already
        // filled the local store.
        if let Some(entry) = self.local.get(&key).await {
            return Ok(entry.into_value());
        }

        let timeout = self.settings.fetch_timeout;
        let outcome = match tokio::time::timeout(timeout, fetch()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("fetch timed out after {}s", timeout.as_secs())),
        };

        match outcome {
            Ok(value) => {
                self.health.record_success();
                self.store(&key, &value, ttl).await;
                Ok(value)
            },
            Err(reason) => self.fail(key, reason).await,
        }
    }

    /// Writes to every tier. Only the local write is guaranteed.
    async fn store(&self, key: &str, value: &V, ttl: Duration) {
        self.local
            .put(CacheEntry::new(key, value.clone(), ttl))
            .await;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.write(key, value, ttl).await {
                self.metrics.record_write_failure(remote.name());
                warn!(
                    cache = self.name,
                    key = %key,
                    backend = remote.name(),
                    error = %e,
                    "Remote write failed, continuing with local store"
                );
            }
        }
    }

    async fn fail(&self, key: String, reason: String) -> Result<V, CacheError> {
        let streak = self.health.record_failure(reason.clone());

        let Some(fallback) = &self.fallback else {
            warn!(cache = self.name, key = %key, reason = %reason, "Upstream fetch failed");
            return Err(CacheError::unavailable(key, reason));
        };

        self.metrics.record_fallback();
        if self.health.is_degraded() {
            error!(
                cache = self.name,
                key = %key,
                streak,
                reason = %reason,
                "Upstream still failing, serving fallback value"
            );
        } else {
            warn!(
                cache = self.name,
                key = %key,
                streak,
                reason = %reason,
                "Upstream fetch failed, serving fallback value"
            );
        }

        // The fallback is never written to the remote store.
        self.local
            .put(CacheEntry::new(
                key,
                fallback.clone(),
                self.settings.fallback_ttl,
            ))
            .await;

        Ok(fallback.clone())
    }
}
