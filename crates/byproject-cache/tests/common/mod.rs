#![allow(dead_code)]
//! Shared fixtures for cache integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use byproject_core::{CurrencyCode, ExchangeRateRow};
use byproject_sources::{RateSource, SourceError, TranslationProvider, TranslationRequest};

/// Helper to parse a currency code.
/// Panics on invalid input (intended for tests).
pub fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).expect("Invalid test currency code")
}

/// Rows matching the production table shape.
pub fn sample_rows() -> Vec<ExchangeRateRow> {
    vec![
        ExchangeRateRow::new("USD", "FCFA", 600.0),
        ExchangeRateRow::new("EUR", "FCFA", 655.0),
        ExchangeRateRow::new("CNY", "FCFA", 85.0),
    ]
}

/// Rate source that counts calls and can be switched to failing.
pub struct CountingRateSource {
    rows: Vec<ExchangeRateRow>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingRateSource {
    pub fn new(rows: Vec<ExchangeRateRow>) -> Arc<Self> {
        Self::with_delay(rows, Duration::ZERO)
    }

    pub fn with_delay(rows: Vec<ExchangeRateRow>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            rows,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay,
        })
    }

    /// Source holding [`sample_rows`] that fails until switched back.
    pub fn failing() -> Arc<Self> {
        let source = Self::new(sample_rows());
        source.set_failing(true);
        source
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for CountingRateSource {
    async fn fetch_all(&self) -> Result<Vec<ExchangeRateRow>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::unavailable("rate source down"));
        }
        Ok(self.rows.clone())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Translator that upper-cases text, counting calls.
pub struct CountingTranslator {
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::from_millis(10),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for CountingTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Http {
                status: 503,
                body: "overloaded".to_string(),
            });
        }
        Ok(format!("[{}] {}", request.target, request.text.to_uppercase()))
    }

    fn name(&self) -> &str {
        "counting"
    }
}
