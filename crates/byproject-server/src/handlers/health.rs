use axum::{Json, extract::State};
use byproject_cache::HealthSnapshot;
use serde::Serialize;

use crate::state::AppState;

/// Health of the service and of each upstream source.
///
/// `status` is `DEGRADED` once a source has failed
/// `fallback_alert_threshold` times in a row.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rates: HealthSnapshot,
    pub translations: HealthSnapshot,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let rates = state.rates().health().snapshot();
    let translations = state.translations().health().snapshot();

    let status = if rates.degraded || translations.degraded {
        "DEGRADED"
    } else {
        "UP"
    };

    Json(HealthResponse {
        status,
        rates,
        translations,
    })
}
