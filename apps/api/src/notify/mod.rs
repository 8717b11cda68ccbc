//! Notification dispatch: hands qualifying candidates to the mailer.
//!
//! The payload `{candidates, jobDescription}` is written to a request-scoped
//! scratch file whose path is the mailer's only argument. The mailer's JSON
//! summary is relayed to the caller unchanged.

pub mod handlers;
#[cfg(test)]
pub mod mock;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::ScriptConfig;
use crate::errors::AppError;
use crate::script_runner::{run_script, ScriptError};
use crate::scratch::ScratchArea;

const PAYLOAD_FILE: &str = "email_data.json";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The mailer wrote to stderr. Carries the raw text.
    #[error("{0}")]
    Stderr(String),
}

/// Body of `POST /send-emails`, also the payload handed to the mailer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Candidate objects as the client sent them (normally `CandidateRecord`s).
    #[serde(default)]
    pub candidates: Vec<Value>,
    #[serde(default)]
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Sends notifications described by a JSON payload file.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, payload_path: &Path) -> Result<Value, DispatchError>;
}

/// Runs `<interpreter> <script> <json-payload-path>`.
/// Unlike the scorer, any stderr output is a failure.
pub struct ScriptMailer {
    config: ScriptConfig,
}

impl ScriptMailer {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for ScriptMailer {
    async fn send(&self, payload_path: &Path) -> Result<Value, DispatchError> {
        let output = run_script(&self.config, [payload_path.as_os_str()]).await?;

        if let Some(stderr) = output.diagnostics() {
            return Err(DispatchError::Stderr(stderr.to_string()));
        }

        Ok(output.json()?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ────────────────────────────────────────────────────────────────────────────

pub async fn dispatch_notifications(
    mailer: &dyn Mailer,
    scratch_root: &Path,
    request: &NotificationRequest,
) -> Result<Value, AppError> {
    if request.candidates.is_empty() {
        return Err(AppError::Validation("No candidates provided".to_string()));
    }

    let scratch = ScratchArea::create(scratch_root)
        .await
        .map_err(|e| AppError::Persistence(format!("could not create scratch area: {e}")))?;
    let payload_path = scratch.file(PAYLOAD_FILE);

    let payload = serde_json::to_vec(request)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode mailer payload: {e}")))?;
    tokio::fs::write(&payload_path, payload)
        .await
        .map_err(|e| AppError::Persistence(format!("{}: {e}", payload_path.display())))?;

    info!(candidates = request.candidates.len(), "Dispatching notification emails");

    let summary = mailer
        .send(&payload_path)
        .await
        .map_err(|e| AppError::Dispatch(e.to_string()))?;

    let sent = summary.get("sentCount").and_then(serde_json::Value::as_u64);
    let failed = summary.get("failedCount").and_then(serde_json::Value::as_u64);
    info!(?sent, ?failed, "Mailer finished");

    Ok(summary)
}
