//! Multipart form reading for the evaluation endpoints.

use axum::{extract::Multipart, http::StatusCode};
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

pub const JOB_DESCRIPTION_FIELD: &str = "jobDescription";
pub const THRESHOLD_FIELD: &str = "threshold";

/// Fields collected from an evaluation upload.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// File parts named after the requested field, in submission order.
    pub files: Vec<Bytes>,
    pub job_description: Option<String>,
    pub threshold: Option<String>,
}

impl UploadForm {
    /// The job description, `None` when absent or blank.
    pub fn job_description(&self) -> Option<&str> {
        self.job_description
            .as_deref()
            .filter(|jd| !jd.trim().is_empty())
    }
}

/// Reads every part of `multipart`. Files are taken from `file_field`; a part
/// with no filename and no bytes (an empty file input) is skipped.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let has_file_name = field.file_name().is_some_and(|f| !f.is_empty());
            let data = field.bytes().await.map_err(malformed)?;
            if data.is_empty() && !has_file_name {
                continue;
            }
            form.files.push(data);
        } else if name == JOB_DESCRIPTION_FIELD {
            form.job_description = Some(field.text().await.map_err(malformed)?);
        } else if name == THRESHOLD_FIELD {
            form.threshold = Some(field.text().await.map_err(malformed)?);
        } else {
            debug!(field = %name, "Ignoring unexpected form field");
        }
    }

    Ok(form)
}

/// Threshold from the form: absent or blank means `default`, anything else
/// must be an integer.
pub fn parse_threshold(raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(default),
        Some(text) => text
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("threshold must be an integer, got '{text}'"))),
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!(
            "Upload exceeds the size limit: {}",
            e.body_text()
        ));
    }
    AppError::Validation(format!("Malformed multipart body: {e}"))
}
