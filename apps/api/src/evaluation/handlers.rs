//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::batch::{evaluate_batch, BatchOptions};
use crate::evaluation::form::{parse_threshold, read_upload_form};
use crate::evaluation::single::evaluate_single;
use crate::models::evaluation::BatchResult;
use crate::scoring::{JobDescription, ScoreResult};
use crate::state::AppState;

pub const SINGLE_FILE_FIELD: &str = "pdfFile";
pub const BATCH_FILE_FIELD: &str = "pdfFiles";

/// POST /evaluate
///
/// Scores one resume and returns the scorer's JSON untouched.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ScoreResult>, AppError> {
    let form = read_upload_form(multipart.map_err(not_multipart)?, SINGLE_FILE_FIELD).await?;

    let pdf = form
        .files
        .first()
        .ok_or_else(|| AppError::Validation("No PDF file provided".to_string()))?;
    let job_description = form
        .job_description()
        .ok_or_else(|| AppError::Validation("No job description provided".to_string()))?;

    let result = evaluate_single(
        state.scorer.as_ref(),
        &state.single_upload,
        pdf,
        &JobDescription::new(job_description),
    )
    .await?;

    Ok(Json(result))
}

/// POST /evaluate-multiple
///
/// Scores every uploaded resume in turn and returns the candidates at or
/// above `threshold`, best first, plus the number of uploads.
pub async fn handle_evaluate_multiple(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchResult>, AppError> {
    let form = read_upload_form(multipart.map_err(not_multipart)?, BATCH_FILE_FIELD).await?;

    if form.files.is_empty() {
        return Err(AppError::Validation("No PDF files provided".to_string()));
    }
    let job_description = form
        .job_description()
        .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;
    let threshold = parse_threshold(form.threshold.as_deref(), state.config.default_threshold)?;

    info!(files = form.files.len(), threshold, "Starting batch evaluation");

    let options = BatchOptions {
        scratch_root: state.config.scratch_root.clone(),
        pacing: state.config.batch_pacing,
        threshold,
    };
    let result = evaluate_batch(
        state.scorer.as_ref(),
        &form.files,
        &JobDescription::new(job_description),
        &options,
    )
    .await?;

    Ok(Json(result))
}

fn not_multipart(rejection: MultipartRejection) -> AppError {
    AppError::Validation(format!("Expected a multipart form: {}", rejection.body_text()))
}
