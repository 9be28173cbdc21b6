//! Cache statistics endpoint.

use axum::{Json, extract::State};
use byproject_cache::CacheStats;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub rates: CacheStats,
    pub translations: CacheStats,
}

/// GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        rates: state.rates().stats(),
        translations: state.translations().stats(),
    })
}
