//! Single-resume evaluation: one upload, one scorer call, result relayed as-is.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::scoring::{JobDescription, ResumeScorer, ScoreResult};

const SINGLE_UPLOAD_NAME: &str = "resume.pdf";

/// The fixed on-disk location single-resume uploads are written to.
///
/// Requests share the path, so they take turns: the lock is held from the
/// write until the scorer has finished reading the file.
#[derive(Debug)]
pub struct SingleUploadSlot {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SingleUploadSlot {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SINGLE_UPLOAD_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Scores one resume. No normalization: the scorer's JSON is returned verbatim.
pub async fn evaluate_single(
    scorer: &dyn ResumeScorer,
    slot: &SingleUploadSlot,
    pdf: &[u8],
    job_description: &JobDescription,
) -> Result<ScoreResult, AppError> {
    let _guard = slot.lock.lock().await;

    persist_upload(slot.path(), pdf).await?;
    info!(
        path = %slot.path().display(),
        bytes = pdf.len(),
        jd_chars = job_description.text().chars().count(),
        "Scoring single resume"
    );

    scorer
        .score(slot.path(), job_description)
        .await
        .map_err(|e| AppError::Scoring(e.to_string()))
}

/// Writes `bytes` to `path`. A missing parent directory is created and the
/// write retried once; any other failure is a persistence error.
async fn persist_upload(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let persistence = |e: std::io::Error| AppError::Persistence(format!("{}: {e}", path.display()));

    match tokio::fs::write(path, bytes).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Upload directory missing, creating it");
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(persistence)?;
            }
            tokio::fs::write(path, bytes).await.map_err(persistence)
        }
        Err(e) => Err(persistence(e)),
    }
}
