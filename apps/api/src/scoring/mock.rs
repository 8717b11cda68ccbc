//! In-memory scorer for tests.
//!
//! The uploaded bytes decide the outcome: `score:<n>` scores `n`, `fail` errors,
//! anything else is echoed back as `{"overallMatch": 0, "raw": <text>}`.
//! Every call is recorded so tests can assert ordering, pacing and cleanup.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use super::{JobDescription, ResumeScorer, ScoreResult, ScoringError};
use crate::script_runner::ScriptError;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: PathBuf,
    pub content: String,
    pub job_description: String,
    pub started: Instant,
    /// Files in the same directory at the moment of the call.
    pub siblings: Vec<PathBuf>,
}

#[derive(Default)]
pub struct MockScorer {
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Builds a scorer payload the way the real script shapes it.
pub fn scored(name: &str, score: u32) -> String {
    format!("score:{score}:{name}")
}

#[async_trait]
impl ResumeScorer for MockScorer {
    async fn score(
        &self,
        pdf_path: &Path,
        job_description: &JobDescription,
    ) -> Result<ScoreResult, ScoringError> {
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let content = tokio::fs::read_to_string(pdf_path)
            .await
            .map_err(ScriptError::Wait)?;

        let siblings = match pdf_path.parent() {
            Some(dir) => std::fs::read_dir(dir)
                .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };

        self.calls.lock().unwrap().push(RecordedCall {
            path: pdf_path.to_path_buf(),
            content: content.clone(),
            job_description: job_description.text().to_string(),
            started: Instant::now(),
            siblings,
        });

        // Yield so overlapping calls would be observable.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if content == "fail" {
            return Err(crashed("scorer crashed"));
        }

        match content.strip_prefix("score:") {
            Some(rest) => {
                let (score, name) = rest.split_once(':').unwrap_or((rest, "Anonymous"));
                let score: u32 = score
                    .parse()
                    .map_err(|_| crashed(&format!("bad mock payload: {content}")))?;
                Ok(json!({
                    "overallMatch": score,
                    "summary": format!("{name} scored {score}"),
                    "Personal Information": {
                        "Name": name,
                        "Email": format!("{}@example.com", name.to_lowercase()),
                    }
                }))
            }
            None => Ok(json!({ "overallMatch": 0, "raw": content })),
        }
    }
}

fn crashed(message: &str) -> ScoringError {
    ScriptError::Wait(io::Error::new(io::ErrorKind::Other, message.to_string())).into()
}
