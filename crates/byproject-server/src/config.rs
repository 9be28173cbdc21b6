//! Server configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. **Built-in defaults**
//! 2. **Legacy variables**: `UPSTASH_REDIS_REST_URL`, `UPSTASH_REDIS_REST_TOKEN`,
//!    `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`, `DEEPSEEK_API_KEY`
//! 3. **Config file**: path taken from `BYPROJECT_CONFIG` (TOML, YAML or JSON)
//! 4. **Environment**: `BYPROJECT__SECTION__FIELD`, e.g. `BYPROJECT__CACHE__TTL_SECS=7200`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use byproject_cache::{CacheSettings, RemoteStoreConfig};
use byproject_core::{CurrencyCode, ExchangeRateTable};
use byproject_sources::SupabaseConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Variable naming the optional config file.
pub const CONFIG_PATH_VAR: &str = "BYPROJECT_CONFIG";

/// Legacy variable names and the keys they feed.
const LEGACY_VARS: [(&str, &str); 5] = [
    ("UPSTASH_REDIS_REST_URL", "upstash.url"),
    ("UPSTASH_REDIS_REST_TOKEN", "upstash.token"),
    ("SUPABASE_URL", "supabase.url"),
    ("SUPABASE_SERVICE_ROLE_KEY", "supabase.service_key"),
    ("DEEPSEEK_API_KEY", "deepseek.api_key"),
];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerSection,
    pub cache: CacheSection,
    #[serde(default)]
    pub upstash: UpstashSection,
    #[serde(default)]
    pub supabase: SupabaseSection,
    #[serde(default)]
    pub deepseek: DeepSeekSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

/// Cache tuning. Durations are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    pub ttl_secs: u64,
    pub fallback_ttl_secs: u64,
    pub translation_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
    pub max_capacity: u64,
    pub cleanup_interval_secs: u64,
    pub fallback_alert_threshold: u32,
    pub base_currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstashSection {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseSection {
    pub url: Option<String>,
    pub service_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepSeekSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(std::env::vars().collect())
    }

    /// Loads configuration from an explicit set of variables.
    pub fn load_from(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("cache.ttl_secs", 3600)?
            .set_default("cache.fallback_ttl_secs", 300)?
            .set_default("cache.translation_ttl_secs", 86_400)?
            .set_default("cache.fetch_timeout_secs", 30)?
            .set_default("cache.max_capacity", 10_000)?
            .set_default("cache.cleanup_interval_secs", 600)?
            .set_default("cache.fallback_alert_threshold", 12)?
            .set_default("cache.base_currency", "FCFA")?;

        for (var, key) in LEGACY_VARS {
            if let Some(value) = vars.get(var).filter(|v| !v.trim().is_empty()) {
                builder = builder.set_default(key, value.as_str())?;
            }
        }

        if let Some(path) = vars.get(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            builder = builder.add_source(File::from(Path::new(path.trim())).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix("BYPROJECT")
                    .separator("__")
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let base = self.base_currency()?;
        self.socket_addr()?;

        // Sin Supabase las tasas salen de la tabla integrada.
        if self.supabase().is_none() && ExchangeRateTable::fallback_for(&base).is_none() {
            return Err(SettingsError::Invalid {
                field: "cache.base_currency",
                reason: format!(
                    "built-in rates have no entry for {}, configure Supabase or use one of {}",
                    base,
                    built_in_currencies()
                ),
            });
        }

        if self.cache.ttl_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "cache.ttl_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.fallback_ttl_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "cache.fallback_ttl_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.fetch_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "cache.fetch_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| SettingsError::Invalid {
                field: "server.host",
                reason: e.to_string(),
            })
    }

    pub fn base_currency(&self) -> Result<CurrencyCode, SettingsError> {
        CurrencyCode::parse(&self.cache.base_currency).map_err(|e| SettingsError::Invalid {
            field: "cache.base_currency",
            reason: e.to_string(),
        })
    }

    /// Settings for the exchange rate cache.
    pub fn rate_settings(&self) -> CacheSettings {
        self.tuned(CacheSettings::default())
            .with_ttl(Duration::from_secs(self.cache.ttl_secs))
    }

    /// Settings for the translation cache.
    pub fn translation_settings(&self) -> CacheSettings {
        self.tuned(CacheSettings::translations())
            .with_ttl(Duration::from_secs(self.cache.translation_ttl_secs))
    }

    fn tuned(&self, settings: CacheSettings) -> CacheSettings {
        settings
            .with_fallback_ttl(Duration::from_secs(self.cache.fallback_ttl_secs))
            .with_fetch_timeout(Duration::from_secs(self.cache.fetch_timeout_secs))
            .with_max_capacity(self.cache.max_capacity)
            .with_alert_threshold(self.cache.fallback_alert_threshold)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cache.cleanup_interval_secs)
    }

    /// Remote store settings, present only when URL and token are both set.
    pub fn remote_store(&self) -> Option<RemoteStoreConfig> {
        RemoteStoreConfig::from_parts(self.upstash.url.clone(), self.upstash.token.clone())
    }

    pub fn supabase(&self) -> Option<SupabaseConfig> {
        SupabaseConfig::from_parts(self.supabase.url.clone(), self.supabase.service_key.clone())
    }

    pub fn deepseek_key(&self) -> Option<&str> {
        self.deepseek
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn built_in_currencies() -> String {
    ExchangeRateTable::fallback()
        .rates()
        .keys()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
