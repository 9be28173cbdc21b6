//! Application state.

use std::sync::Arc;

use byproject_cache::{
    CacheStore, ExchangeRateCache, ExpiredCleanup, StoreError, TranslationCache, UpstashStore,
};
use byproject_core::{CurrencyCode, ExchangeRateRow, ExchangeRateTable};
use byproject_sources::{
    DeepSeekTranslator, DisabledTranslator, RateSource, StaticRateSource, SupabaseRateSource,
    TranslationProvider,
};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    rates: ExchangeRateCache,
    translations: TranslationCache,
}

impl AppState {
    pub fn new(rates: ExchangeRateCache, translations: TranslationCache) -> Self {
        Self {
            rates,
            translations,
        }
    }

    /// Wires sources, stores and caches from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let base = config.base_currency()?;

        let rate_source: Arc<dyn RateSource> = match config.supabase() {
            Some(supabase) => {
                info!(url = %supabase.url(), "Reading exchange rates from Supabase");
                Arc::new(SupabaseRateSource::new(supabase)?)
            },
            None => {
                warn!("Supabase is not configured, serving the built-in rate table");
                let rows = default_rows(&base).ok_or_else(|| {
                    anyhow::anyhow!("built-in rates have no entry for base currency {}", base)
                })?;
                Arc::new(StaticRateSource::new(rows))
            },
        };

        let provider: Arc<dyn TranslationProvider> = match config.deepseek_key() {
            Some(key) => match &config.deepseek.base_url {
                Some(base_url) => Arc::new(DeepSeekTranslator::with_base_url(key, base_url)?),
                None => Arc::new(DeepSeekTranslator::new(key)?),
            },
            None => {
                warn!("DEEPSEEK_API_KEY is not set, translations return the original text");
                Arc::new(DisabledTranslator)
            },
        };

        let (rate_store, translation_store) = remote_stores(config)?;

        let rates = ExchangeRateCache::new(rate_source, base, config.rate_settings(), rate_store);
        let translations =
            TranslationCache::new(provider, config.translation_settings(), translation_store);

        Ok(Self::new(rates, translations))
    }

    pub fn rates(&self) -> &ExchangeRateCache {
        &self.rates
    }

    pub fn translations(&self) -> &TranslationCache {
        &self.translations
    }

    /// Caches swept by the cleanup scheduler.
    pub fn cleanup_targets(&self) -> Vec<Arc<dyn ExpiredCleanup>> {
        vec![
            Arc::new(self.rates.core().clone()),
            Arc::new(self.translations.core().clone()),
        ]
    }
}

type RemoteStores = (
    Option<Arc<dyn CacheStore<ExchangeRateTable>>>,
    Option<Arc<dyn CacheStore<String>>>,
);

/// Both caches share one HTTP client towards Upstash.
fn remote_stores(config: &AppConfig) -> Result<RemoteStores, StoreError> {
    let Some(remote) = config.remote_store() else {
        return Ok((None, None));
    };

    let rates = UpstashStore::<ExchangeRateTable>::new(remote.clone())?;
    let translations = UpstashStore::<String>::with_client(remote, rates.client().clone());

    Ok((Some(Arc::new(rates)), Some(Arc::new(translations))))
}

/// Rows reproducing the built-in table against `base`, for running
/// without Supabase.
fn default_rows(base: &CurrencyCode) -> Option<Vec<ExchangeRateRow>> {
    let table = ExchangeRateTable::fallback_for(base)?;
    let rows = table
        .rates()
        .iter()
        .filter(|(code, _)| *code != base)
        .map(|(code, rate)| ExchangeRateRow::new(code.as_str(), base.as_str(), *rate))
        .collect();
    Some(rows)
}
