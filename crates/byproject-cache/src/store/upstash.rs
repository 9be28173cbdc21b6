//! Shared store on Upstash Redis, spoken to through its REST API.
//!
//! Every command is a JSON array POSTed to the database URL, for example
//! `["SET", "rates:v1", "<json>", "PX", "3600000"]`. Values are wrapped with
//! their wall-clock timestamps so a reader on another instance can rebuild
//! the entry's age and remaining lifetime.

use std::marker::PhantomData;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::CacheStore;
use crate::entry::CacheEntry;
use crate::error::StoreError;

const BACKEND: &str = "upstash";

/// Connection settings for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    pub url: String,
    pub token: String,
}

impl RemoteStoreConfig {
    /// Returns a configuration only when both URL and token are non-empty.
    ///
    /// Anything else means the cache runs local-only.
    pub fn from_parts(url: Option<String>, token: Option<String>) -> Option<Self> {
        let url = url?.trim().trim_end_matches('/').to_string();
        let token = token?.trim().to_string();
        if url.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self { url, token })
    }
}

/// Envelope stored under each key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<V> {
    value: V,
    created_at_ms: u64,
    expires_at_ms: u64,
}

/// Upstash REST response: either `result` or `error`.
#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Remote tier backed by Upstash Redis.
pub struct UpstashStore<V> {
    config: RemoteStoreConfig,
    client: reqwest::Client,
    _value: PhantomData<fn() -> V>,
}

impl<V> UpstashStore<V> {
    /// Creates a store with its own HTTP client.
    pub fn new(config: RemoteStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a store sharing an existing HTTP client.
    pub fn with_client(config: RemoteStoreConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            _value: PhantomData,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn command(&self, args: &[&str]) -> Result<serde_json::Value, StoreError> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(args)
            .send()
            .await
            .map_err(|e| StoreError::unreachable(BACKEND, e.to_string()))?;

        let status = response.status();
        let body: CommandResponse = response
            .json()
            .await
            .map_err(|e| StoreError::rejected(BACKEND, format!("status {}: {}", status, e)))?;

        if let Some(error) = body.error {
            return Err(StoreError::rejected(BACKEND, error));
        }
        if !status.is_success() {
            return Err(StoreError::rejected(BACKEND, format!("status {}", status)));
        }
        Ok(body.result)
    }

    fn decode(key: &str, raw: &str) -> Result<Option<CacheEntry<V>>, StoreError>
    where
        V: DeserializeOwned,
    {
        let stored: StoredEntry<V> = serde_json::from_str(raw)?;
        let now_ms = epoch_millis();
        if stored.expires_at_ms <= now_ms {
            return Ok(None);
        }

        // Wall-clock timestamps are translated onto the monotonic clock.
        let now = Instant::now();
        let expires_at = now + Duration::from_millis(stored.expires_at_ms - now_ms);
        let age = Duration::from_millis(now_ms.saturating_sub(stored.created_at_ms));
        let created_at = now.checked_sub(age).unwrap_or(now);

        Ok(Some(CacheEntry::with_times(
            key,
            stored.value,
            created_at,
            expires_at,
        )))
    }
}

#[async_trait]
impl<V> CacheStore<V> for UpstashStore<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self, key: &str) -> Result<Option<CacheEntry<V>>, StoreError> {
        match self.command(&["GET", key]).await? {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(raw) => Self::decode(key, &raw),
            other => Err(StoreError::Serialization(format!(
                "unexpected GET result for '{}': {}",
                key, other
            ))),
        }
    }

    async fn write(&self, key: &str, value: &V, ttl: Duration) -> Result<(), StoreError> {
        let created_at_ms = epoch_millis();
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        let stored = StoredEntry {
            value,
            created_at_ms,
            expires_at_ms: created_at_ms + ttl_ms,
        };
        let payload = serde_json::to_string(&stored)?;
        let ttl_arg = ttl_ms.to_string();

        self.command(&["SET", key, &payload, "PX", &ttl_arg]).await?;
        debug!(key = %key, ttl_ms, "Remote entry written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize, StoreError> {
        let keys: Vec<String> = match self.command(&["KEYS", pattern]).await? {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        if keys.is_empty() {
            return Ok(0);
        }

        let mut args = Vec::with_capacity(keys.len() + 1);
        args.push("DEL");
        args.extend(keys.iter().map(String::as_str));
        let deleted = self.command(&args).await?;

        Ok(deleted.as_u64().map(|n| n as usize).unwrap_or(keys.len()))
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
