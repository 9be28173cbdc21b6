//! Backend stores.
//!
//! Every cache has a [`LocalStore`] and optionally a remote store shared
//! across instances. Both implement [`CacheStore`]; the cache core only
//! talks to that trait.

mod local;
mod upstash;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::entry::CacheEntry;
use crate::error::StoreError;

pub use local::LocalStore;
pub use upstash::{RemoteStoreConfig, UpstashStore};

/// Key/entry storage with per-entry TTL.
#[async_trait]
pub trait CacheStore<V>: Send + Sync {
    /// Reads a live entry. Expired entries are reported as absent.
    async fn read(&self, key: &str) -> Result<Option<CacheEntry<V>>, StoreError>;

    /// Writes a value that expires after `ttl`.
    async fn write(&self, key: &str, value: &V, ttl: Duration) -> Result<(), StoreError>;

    /// Deletes an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Deletes every entry whose key matches a glob pattern.
    ///
    /// Returns the number of deleted entries.
    async fn delete_matching(&self, pattern: &str) -> Result<usize, StoreError>;

    /// Short backend name for logs and metrics.
    fn name(&self) -> &'static str;
}

/// Which tiers a cache is running with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Local map mirrored to a shared Redis store.
    Redis,
    /// Local map only.
    Memory,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis => f.write_str("redis"),
            Self::Memory => f.write_str("memory"),
        }
    }
}
