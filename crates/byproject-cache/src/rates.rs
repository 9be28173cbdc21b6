//! Exchange rate cache and currency conversion.

use std::sync::Arc;
use std::time::Duration;

use byproject_core::{Conversion, ConvertedPrice, CurrencyCode, ExchangeRateTable, Price};
use byproject_sources::{RateSource, SourceError};
use tracing::{debug, warn};

use crate::config::CacheSettings;
use crate::core::{CacheCore, CacheStats};
use crate::health::SourceHealth;
use crate::key::{RATES_KEY, pair_key};
use crate::store::CacheStore;

/// Wholesale exchange rate table behind the coalescing cache.
///
/// The table is fetched in one query and kept under [`RATES_KEY`]. When the
/// source fails, the static default table is served for the fallback TTL,
/// rebased onto the configured base when it lists that currency.
#[derive(Clone)]
pub struct ExchangeRateCache {
    core: CacheCore<ExchangeRateTable>,
    source: Arc<dyn RateSource>,
    base: CurrencyCode,
    defaults: ExchangeRateTable,
}

impl ExchangeRateCache {
    /// Creates a cache reading from `source`.
    pub fn new(
        source: Arc<dyn RateSource>,
        base: CurrencyCode,
        settings: CacheSettings,
        remote: Option<Arc<dyn CacheStore<ExchangeRateTable>>>,
    ) -> Self {
        let defaults = ExchangeRateTable::fallback_for(&base).unwrap_or_else(|| {
            warn!(base = %base, "Default rate table has no entry for the base currency");
            ExchangeRateTable::fallback()
        });
        let core = CacheCore::builder("rates")
            .settings(settings)
            .remote_opt(remote)
            .fallback(defaults.clone())
            .build();

        Self {
            core,
            source,
            base,
            defaults,
        }
    }

    /// Returns the current table.
    ///
    /// Never fails: an unavailable source yields the default table.
    pub async fn get_rates(&self) -> ExchangeRateTable {
        let (source, base) = (Arc::clone(&self.source), self.base.clone());
        let ttl = self.core.settings().ttl;

        self.core
            .get(RATES_KEY, move || fetch_table(source, base), ttl)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Rate cache returned no table, using defaults");
                self.defaults.clone()
            })
    }

    /// Drops the cached table and fetches a fresh one.
    pub async fn refresh(&self) -> ExchangeRateTable {
        let (source, base) = (Arc::clone(&self.source), self.base.clone());
        let ttl = self.core.settings().ttl;

        self.core
            .refresh(RATES_KEY, move || fetch_table(source, base), ttl)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Rate refresh returned no table, using defaults");
                self.defaults.clone()
            })
    }

    /// Drops the cached table. The next read fetches again.
    pub async fn invalidate(&self) {
        self.core.invalidate(RATES_KEY).await;
    }

    /// Age of the live table, if any.
    pub async fn cache_age(&self) -> Option<Duration> {
        self.core.entry(RATES_KEY).await.map(|entry| entry.age())
    }

    /// Returns true if a live table is held locally.
    pub async fn is_live(&self) -> bool {
        self.core.is_live(RATES_KEY).await
    }

    /// True while the table being served is the default one.
    pub fn is_fallback(&self) -> bool {
        self.core.health().is_failing()
    }

    pub fn health(&self) -> &SourceHealth {
        self.core.health()
    }

    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    pub fn core(&self) -> &CacheCore<ExchangeRateTable> {
        &self.core
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Converts `amount` from one currency to another.
    ///
    /// Same-currency conversions return the amount untouched without
    /// reading the table. A missing rate yields the original amount with an
    /// unconverted status.
    pub async fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> Conversion {
        if from == to {
            return Conversion::unchanged(amount, to.clone());
        }

        let conversion = self.get_rates().await.convert(amount, from, to);

        match conversion.warning() {
            Some(reason) => warn!(pair = %pair_key(from, to), reason, "Amount left unconverted"),
            None => debug!(pair = %pair_key(from, to), amount, result = conversion.amount, "Converted"),
        }

        conversion
    }

    /// Converts a price and its variations into `target`.
    pub async fn convert_price(&self, price: &Price, target: &CurrencyCode) -> ConvertedPrice {
        if &price.currency == target {
            return ExchangeRateTable::new(target.clone()).convert_price(price, target);
        }
        self.get_rates().await.convert_price(price, target)
    }
}

async fn fetch_table(
    source: Arc<dyn RateSource>,
    base: CurrencyCode,
) -> Result<ExchangeRateTable, SourceError> {
    let rows = source.fetch_all().await?;
    let total = rows.len();
    let build = ExchangeRateTable::from_rows(base, rows);

    for rejected in &build.rejected {
        warn!(source = source.name(), error = %rejected, "Skipping exchange rate row");
    }
    if build.table.is_empty() {
        return Err(SourceError::invalid_response(format!(
            "no usable exchange rate among {} rows",
            total
        )));
    }

    debug!(
        source = source.name(),
        rates = build.table.len(),
        pairs = build.table.pairs().len(),
        "Exchange rate table built"
    );
    Ok(build.table)
}
