//! Estado de prueba con fuentes en memoria.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use byproject_cache::{CacheSettings, ExchangeRateCache, TranslationCache};
use byproject_core::{CurrencyCode, ExchangeRateRow, Language};
use byproject_server::metrics::setup::detached_handle;
use byproject_server::{AppState, create_router};
use byproject_sources::{RateSource, SourceError, StaticRateSource, StaticTranslator, TranslationProvider};

use super::client::TestClient;

pub fn sample_rows() -> Vec<ExchangeRateRow> {
    vec![
        ExchangeRateRow::new("USD", "FCFA", 600.0),
        ExchangeRateRow::new("EUR", "FCFA", 655.0),
        ExchangeRateRow::new("CNY", "FCFA", 85.0),
    ]
}

pub fn sample_translator() -> StaticTranslator {
    StaticTranslator::new()
        .with(Language::Fr, Language::En, "Ciment", "Cement")
        .with(Language::Fr, Language::En, "Sable", "Sand")
        .with(Language::Fr, Language::Zh, "Ciment", "水泥")
}

/// Rate source that always fails, counting calls.
#[derive(Default)]
pub struct DownRateSource {
    pub calls: AtomicUsize,
}

#[async_trait]
impl RateSource for DownRateSource {
    async fn fetch_all(&self) -> Result<Vec<ExchangeRateRow>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "down"
    }
}

pub fn state_with(
    rates: Arc<dyn RateSource>,
    provider: Arc<dyn TranslationProvider>,
    settings: CacheSettings,
) -> AppState {
    AppState::new(
        ExchangeRateCache::new(rates, CurrencyCode::fcfa(), settings.clone(), None),
        TranslationCache::new(provider, settings, None),
    )
}

pub fn sample_state() -> AppState {
    state_with(
        Arc::new(StaticRateSource::new(sample_rows())),
        Arc::new(sample_translator()),
        CacheSettings::default(),
    )
}

pub fn client_for(state: AppState) -> TestClient {
    TestClient::new(create_router(state, detached_handle()))
}

/// Cliente sobre el estado de ejemplo.
pub fn client() -> TestClient {
    client_for(sample_state())
}
