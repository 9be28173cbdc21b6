//! Translation handlers.

use std::str::FromStr;

use axum::{Json, extract::State};
use byproject_cache::Translation;
use byproject_core::Language;
use byproject_sources::TranslationRequest;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Largest number of texts accepted by the batch endpoint.
pub const MAX_BATCH_SIZE: usize = 100;

/// Request body for one translation. The source language defaults to French.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    pub text: String,
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_language: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl TranslateBody {
    fn into_request(self) -> Result<TranslationRequest, AppError> {
        let source = match self.source_language.as_deref() {
            Some(code) => Language::from_str(code)?,
            None => Language::default(),
        };
        let target = Language::from_str(&self.target_language)?;

        let request = TranslationRequest::new(self.text, source, target);
        Ok(match self.context.filter(|c| !c.trim().is_empty()) {
            Some(context) => request.with_context(context),
            None => request,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub original_text: String,
    pub translated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Translation> for TranslateResponse {
    fn from(translation: Translation) -> Self {
        let error = translation.error().map(str::to_string);
        Self {
            translated: translation.is_translated(),
            translated_text: translation.translated_text,
            original_text: translation.original_text,
            error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub items: Vec<TranslateBody>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<TranslateResponse>,
}

/// POST /translate
///
/// Provider failures are not errors here: the response carries the
/// original text with `translated: false`.
#[instrument(skip_all, fields(target = %body.target_language))]
pub async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<TranslateResponse>, AppError> {
    let request = body.into_request()?;
    let translation = state.translations().translate(request).await;

    Ok(Json(translation.into()))
}

/// POST /translate/batch
#[instrument(skip_all, fields(items = body.items.len()))]
pub async fn translate_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchBody>,
) -> Result<Json<BatchResponse>, AppError> {
    if body.items.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "batch holds {} items, at most {} are accepted",
            body.items.len(),
            MAX_BATCH_SIZE
        )));
    }

    let requests = body
        .items
        .into_iter()
        .map(TranslateBody::into_request)
        .collect::<Result<Vec<_>, _>>()?;

    let results = state
        .translations()
        .translate_batch(requests)
        .await
        .into_iter()
        .map(TranslateResponse::from)
        .collect();

    Ok(Json(BatchResponse { results }))
}
