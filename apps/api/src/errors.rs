use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "success": false, "error": ..., "code": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transcript has no candidate turns to score")]
    InsufficientTranscript,

    #[error("Question generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generative backend unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Malformed scoring output: {0}")]
    MalformedScoringOutput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::InsufficientTranscript => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_TRANSCRIPT",
                self.to_string(),
            ),
            AppError::GenerationFailed(msg) => {
                tracing::error!("Question generation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_FAILED",
                    "Failed to generate interview questions".to_string(),
                )
            }
            AppError::GenerationUnavailable(msg) => {
                tracing::error!("Generative backend unavailable: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_UNAVAILABLE",
                    "The AI backend is currently unavailable".to_string(),
                )
            }
            AppError::MalformedScoringOutput(msg) => {
                tracing::error!("Malformed scoring output: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_SCORING_OUTPUT",
                    "The AI backend returned an invalid score".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
