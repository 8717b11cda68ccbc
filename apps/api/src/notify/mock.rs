//! In-memory mailer for tests. Reads the payload file at call time so tests
//! can inspect exactly what the real mailer would have received.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{DispatchError, Mailer};

pub struct MockMailer {
    reply: Result<Value, String>,
    paths: Mutex<Vec<PathBuf>>,
    payloads: Mutex<Vec<Value>>,
}

impl MockMailer {
    pub fn replying(summary: Value) -> Self {
        Self::with_reply(Ok(summary))
    }

    /// Simulates a mailer that wrote `stderr` and therefore failed.
    pub fn failing(stderr: &str) -> Self {
        Self::with_reply(Err(stderr.to_string()))
    }

    fn with_reply(reply: Result<Value, String>) -> Self {
        Self {
            reply,
            paths: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, payload_path: &Path) -> Result<Value, DispatchError> {
        let raw = tokio::fs::read(payload_path)
            .await
            .map_err(|e| DispatchError::Stderr(format!("could not read payload: {e}")))?;
        let payload: Value = serde_json::from_slice(&raw)
            .map_err(|e| DispatchError::Stderr(format!("payload is not JSON: {e}")))?;

        self.paths.lock().unwrap().push(payload_path.to_path_buf());
        self.payloads.lock().unwrap().push(payload);

        self.reply.clone().map_err(DispatchError::Stderr)
    }
}
