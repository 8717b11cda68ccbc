//! Resume scoring: pluggable, trait-based scorer that rates one resume PDF
//! against a job description.
//!
//! Default: `ScriptScorer` (runs the external scoring script).
//! `AppState` holds an `Arc<dyn ResumeScorer>`, so an in-process model can
//! replace the script without touching the evaluators.

pub mod extract;
#[cfg(test)]
pub mod mock;

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::ScriptConfig;
use crate::script_runner::{run_script, ScriptError};

/// Raw JSON emitted by the scorer for one resume. Its shape is owned by the
/// scorer; callers relay it or pick fields out with `extract`.
pub type ScoreResult = Value;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// A job description together with its base64 form.
///
/// The scorer script receives the text base64-encoded so quotes, newlines and
/// control characters survive the trip through argv. Encoding happens once
/// per request and is shared by every resume in a batch.
#[derive(Debug, Clone)]
pub struct JobDescription {
    text: String,
    encoded: String,
}

impl JobDescription {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let encoded = STANDARD.encode(text.as_bytes());
        Self { text, encoded }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The resume scorer trait. Implement this to swap backends without touching
/// the endpoint, handler, or evaluator code.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(
        &self,
        pdf_path: &Path,
        job_description: &JobDescription,
    ) -> Result<ScoreResult, ScoringError>;
}

// ────────────────────────────────────────────────────────────────────────────
// ScriptScorer (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// Runs `<interpreter> <script> <pdf-path> <base64-job-description>` and
/// parses stdout as JSON. Stderr is advisory and only logged.
pub struct ScriptScorer {
    config: ScriptConfig,
}

impl ScriptScorer {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResumeScorer for ScriptScorer {
    async fn score(
        &self,
        pdf_path: &Path,
        job_description: &JobDescription,
    ) -> Result<ScoreResult, ScoringError> {
        let output = run_script(
            &self.config,
            [pdf_path.as_os_str(), OsStr::new(job_description.encoded())],
        )
        .await?;

        if let Some(diagnostics) = output.diagnostics() {
            warn!(
                pdf = %pdf_path.display(),
                stderr = diagnostics,
                "Scorer wrote to stderr"
            );
        }

        Ok(output.json()?)
    }
}
