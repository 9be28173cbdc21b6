//! Cache invalidation endpoint handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
};
use byproject_core::Language;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Número de entries locales invalidadas.
    pub invalidated: usize,
    /// Mensaje descriptivo.
    pub message: String,
}

/// DELETE /cache/rates
/// Invalida la tabla de tasas; la siguiente lectura vuelve a la fuente.
#[instrument(skip_all)]
pub async fn invalidate_rates(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let was_live = state.rates().is_live().await;
    state.rates().invalidate().await;

    tracing::info!(was_live, "Exchange rate cache invalidated");

    Json(InvalidateResponse {
        invalidated: usize::from(was_live),
        message: "Invalidated the exchange rate table".to_string(),
    })
}

/// DELETE /cache/translations
/// Invalida todas las traducciones.
#[instrument(skip_all)]
pub async fn invalidate_translations(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let result = state.translations().invalidate_all().await;

    tracing::info!(
        count = result.count,
        remote_count = result.remote_count,
        "Translation cache invalidated"
    );

    Json(InvalidateResponse {
        invalidated: result.count,
        message: format!("Invalidated {} cached translations", result.count),
    })
}

/// DELETE /cache/translations/{source}/{target}
/// Invalida las traducciones de un par de idiomas.
#[instrument(skip_all, fields(source = %path.source, target = %path.target))]
pub async fn invalidate_translation_pair(
    State(state): State<AppState>,
    Path(path): Path<LanguagePairPath>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let source = Language::from_str(&path.source)?;
    let target = Language::from_str(&path.target)?;

    let result = state.translations().invalidate_pair(source, target).await;

    tracing::info!(count = result.count, "Translation pair invalidated");

    Ok(Json(InvalidateResponse {
        invalidated: result.count,
        message: format!(
            "Invalidated {} cached translations from '{}' to '{}'",
            result.count, source, target
        ),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LanguagePairPath {
    pub source: String,
    pub target: String,
}
