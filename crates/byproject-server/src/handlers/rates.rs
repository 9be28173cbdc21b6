//! Exchange rate and conversion handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use byproject_cache::ExchangeRateCache;
use byproject_core::{Conversion, CurrencyCode, ExchangeRateTable, format_conversion};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Rate table with cache diagnostics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    #[serde(flatten)]
    pub table: ExchangeRateTable,
    pub cache_age_seconds: Option<u64>,
    pub is_live: bool,
    /// True while the built-in table is served instead of fetched rates.
    pub fallback: bool,
}

impl RatesResponse {
    async fn build(cache: &ExchangeRateCache, table: ExchangeRateTable) -> Self {
        Self {
            table,
            cache_age_seconds: cache.cache_age().await.map(|age| age.as_secs()),
            is_live: cache.is_live().await,
            fallback: cache.is_fallback(),
        }
    }
}

/// GET /rates
#[instrument(skip_all)]
pub async fn get_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let table = state.rates().get_rates().await;
    Json(RatesResponse::build(state.rates(), table).await)
}

/// POST /rates/refresh
/// Descarta la tabla en cache y la vuelve a leer.
#[instrument(skip_all)]
pub async fn refresh_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let table = state.rates().refresh().await;

    tracing::info!(
        rates = table.len(),
        fallback = state.rates().is_fallback(),
        "Exchange rates refreshed"
    );

    Json(RatesResponse::build(state.rates(), table).await)
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub original_amount: f64,
    pub original_currency: CurrencyCode,
    #[serde(flatten)]
    pub result: Conversion,
    /// Display string, e.g. `6 550 FCFA (10 EUR)`.
    pub formatted: String,
}

/// GET /convert?amount=&from=&to=
#[instrument(skip_all, fields(from = %query.from, to = %query.to))]
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertResponse>, AppError> {
    if !query.amount.is_finite() || query.amount < 0.0 {
        return Err(AppError::BadRequest(format!(
            "amount must be a finite, non-negative number, got {}",
            query.amount
        )));
    }

    let from = CurrencyCode::parse(&query.from)?;
    let to = CurrencyCode::parse(&query.to)?;

    let result = state.rates().convert(query.amount, &from, &to).await;
    let formatted = format_conversion(&result, Some((query.amount, &from)));

    Ok(Json(ConvertResponse {
        original_amount: query.amount,
        original_currency: from,
        result,
        formatted,
    }))
}
