use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),

    #[error("Email dispatch failed: {0}")]
    Dispatch(String),

    #[error("Failed to persist upload: {0}")]
    Persistence(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status code and machine-readable code for this error.
    /// Server-side failures are logged here, once, at the response boundary.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Scoring(msg) => {
                tracing::error!("Scoring error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "SCORING_ERROR")
            }
            AppError::Dispatch(msg) => {
                tracing::error!("Dispatch error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DISPATCH_ERROR")
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        let body = Json(json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Error wrapper for the email route, whose clients expect
/// `{ "success": false, "error": ... }` instead of the default body.
#[derive(Debug)]
pub struct DispatchRejection(pub AppError);

impl From<AppError> for DispatchRejection {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DispatchRejection {
    fn into_response(self) -> Response {
        let (status, _) = self.0.classify();
        let message = match &self.0 {
            // Mailer stderr is relayed raw.
            AppError::Dispatch(msg) => msg.clone(),
            other => other.to_string(),
        };
        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
