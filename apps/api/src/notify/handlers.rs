//! Axum route handler for the Notification API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::errors::{AppError, DispatchRejection};
use crate::notify::{dispatch_notifications, NotificationRequest};
use crate::state::AppState;

/// POST /send-emails
///
/// Writes the candidates to a scratch payload, runs the mailer, and relays its
/// JSON summary. Failures answer `{ "success": false, "error": ... }`.
pub async fn handle_send_emails(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<Value>, DispatchRejection> {
    let Json(request) = payload.map_err(rejected)?;

    let summary = dispatch_notifications(
        state.mailer.as_ref(),
        &state.config.scratch_root,
        &request,
    )
    .await?;

    Ok(Json(summary))
}

fn rejected(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::Validation(rejection.body_text())
    }
}
