use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use byproject_core::ByprojectError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    /// Parametros invalidos
    BadRequest(String),

    /// Idioma no soportado
    UnsupportedLanguage(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<ByprojectError> for AppError {
    fn from(err: ByprojectError) -> Self {
        match err {
            ByprojectError::UnsupportedLanguage(code) => AppError::UnsupportedLanguage(code),
            err if err.is_validation_error() => AppError::BadRequest(err.to_string()),
            err => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::UnsupportedLanguage(code) => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                format!("Unsupported language '{}', expected one of fr, en, zh", code),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
