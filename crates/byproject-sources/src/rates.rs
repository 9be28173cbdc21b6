//! Exchange rate sources.

use std::time::Duration;

use async_trait::async_trait;
use byproject_core::ExchangeRateRow;
use tracing::{debug, instrument};

use crate::error::SourceError;

/// Columns requested from the `exchange_rates` table.
const RATE_COLUMNS: &str = "from_currency,to_currency,rate,updated_at";

/// Default timeout applied to each HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Trait for anything that can produce the full list of exchange rate rows.
///
/// A source is queried wholesale: one call returns every known rate, newest
/// first when the source tracks update times.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches every exchange rate row.
    async fn fetch_all(&self) -> Result<Vec<ExchangeRateRow>, SourceError>;

    /// Returns a short name for logging.
    fn name(&self) -> &str;
}

/// Connection settings for the Supabase REST API.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    url: String,
    service_key: String,
    timeout: Duration,
}

impl SupabaseConfig {
    /// Creates a configuration, requiring both values to be non-empty.
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Result<Self, SourceError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let service_key = service_key.into().trim().to_string();

        if url.is_empty() {
            return Err(SourceError::invalid_config("supabase url is empty"));
        }
        if service_key.is_empty() {
            return Err(SourceError::invalid_config("supabase service key is empty"));
        }

        Ok(Self {
            url,
            service_key,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Builds a configuration only when both values are present.
    pub fn from_parts(url: Option<String>, service_key: Option<String>) -> Option<Self> {
        Self::new(url?, service_key?).ok()
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the project URL without trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Reads the `exchange_rates` table through Supabase's PostgREST endpoint.
pub struct SupabaseRateSource {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseRateSource {
    /// Creates a new source.
    pub fn new(config: SupabaseConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::invalid_config(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/exchange_rates", self.config.url)
    }
}

#[async_trait]
impl RateSource for SupabaseRateSource {
    #[instrument(skip(self), fields(source = "supabase"))]
    async fn fetch_all(&self) -> Result<Vec<ExchangeRateRow>, SourceError> {
        let timeout_secs = self.config.timeout.as_secs();

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("select", RATE_COLUMNS), ("order", "updated_at.desc")])
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(status, body));
        }

        let rows: Vec<ExchangeRateRow> = response
            .json()
            .await
            .map_err(|e| SourceError::invalid_response(e.to_string()))?;

        debug!(rows = rows.len(), "Fetched exchange rate rows");
        Ok(rows)
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

/// A rate source backed by a fixed list of rows.
///
/// Used when no remote source is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rows: Vec<ExchangeRateRow>,
}

impl StaticRateSource {
    pub fn new(rows: Vec<ExchangeRateRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_all(&self) -> Result<Vec<ExchangeRateRow>, SourceError> {
        Ok(self.rows.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
