//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!(
        "byproject_cache_hits_total",
        "Total number of cache hits, by tier"
    );
    metrics::describe_counter!("byproject_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "byproject_cache_fallbacks_total",
        "Upstream failures answered with the fallback value"
    );
    metrics::describe_counter!(
        "byproject_cache_coalesced_total",
        "Callers that joined an in-flight fetch"
    );
    metrics::describe_counter!(
        "byproject_cache_backend_write_failures_total",
        "Writes rejected by a backend store"
    );
    metrics::describe_counter!(
        "byproject_cache_evictions_total",
        "Local entries evicted by expiry or capacity"
    );
    metrics::describe_gauge!("byproject_cache_entries", "Current number of local entries");
    metrics::describe_histogram!(
        "byproject_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Tier que respondio un hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTier {
    Local,
    Remote,
}

impl HitTier {
    fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Recorder de metricas de un cache.
/// Los contadores atomicos alimentan `stats()`; el resto va al exporter.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    cache: &'static str,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    fallbacks: Arc<AtomicU64>,
    coalesced: Arc<AtomicU64>,
    write_failures: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl CacheMetrics {
    /// Crea un recorder etiquetado con el nombre del cache.
    pub fn new(cache: &'static str) -> Self {
        Self {
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            fallbacks: Arc::new(AtomicU64::new(0)),
            coalesced: Arc::new(AtomicU64::new(0)),
            write_failures: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self, tier: HitTier) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!(
            "byproject_cache_hits_total",
            "cache" => self.cache,
            "tier" => tier.as_str()
        )
        .increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("byproject_cache_misses_total", "cache" => self.cache).increment(1);
    }

    /// Registra la activacion del valor de fallback
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        counter!("byproject_cache_fallbacks_total", "cache" => self.cache).increment(1);
    }

    /// Registra un caller que se unio a un fetch en curso
    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
        counter!("byproject_cache_coalesced_total", "cache" => self.cache).increment(1);
    }

    /// Registra una escritura fallida en un backend
    pub fn record_write_failure(&self, backend: &'static str) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        counter!(
            "byproject_cache_backend_write_failures_total",
            "cache" => self.cache,
            "backend" => backend
        )
        .increment(1);
    }

    /// Registra una eviction por TTL o capacidad.
    /// Reemplazos y borrados explicitos no cuentan.
    pub fn record_eviction(&self, reason: &'static str) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!(
            "byproject_cache_evictions_total",
            "cache" => self.cache,
            "reason" => reason
        )
        .increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: u64) {
        gauge!("byproject_cache_entries", "cache" => self.cache).set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(
            "byproject_cache_operation_seconds",
            "cache" => self.cache,
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn cache(&self) -> &'static str {
        self.cache
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}
