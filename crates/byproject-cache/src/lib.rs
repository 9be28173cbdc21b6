//! ByProject Cache - Coalescing TTL cache
//!
//! A small cache for volatile external lookups, used twice:
//!
//! - [`ExchangeRateCache`]: one wholesale rate table, with a static default
//!   table served for a short while when the rate source is down
//! - [`TranslationCache`]: one entry per `(source, target, text)`, with a
//!   "translation failed" marker instead of a fallback value
//!
//! Both sit on [`CacheCore`], which reads a local [`LocalStore`], then an
//! optional remote store ([`UpstashStore`]), and otherwise runs one
//! coordinated upstream fetch per key through the [`FetchCoordinator`].

pub mod cleanup;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod entry;
pub mod error;
pub mod health;
pub mod invalidation;
pub mod key;
pub mod metrics;
pub mod rates;
pub mod store;
pub mod translations;

pub use cleanup::{CleanupHandle, CleanupScheduler, DEFAULT_CLEANUP_INTERVAL, ExpiredCleanup};
pub use config::CacheSettings;
pub use coordinator::{FetchCoordinator, FetchRole};
pub use crate::core::{CacheCore, CacheCoreBuilder, CacheStats};
pub use entry::CacheEntry;
pub use error::{CacheError, StoreError};
pub use health::{HealthSnapshot, SourceHealth};
pub use invalidation::InvalidationResult;
pub use key::{RATES_KEY, pair_key, translation_key};
pub use crate::metrics::{CacheMetrics, register_cache_metrics};
pub use rates::ExchangeRateCache;
pub use store::{CacheStore, LocalStore, RemoteStoreConfig, StorageType, UpstashStore};
pub use translations::{Translation, TranslationCache, TranslationStatus};
