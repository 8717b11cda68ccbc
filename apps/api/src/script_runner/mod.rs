/// Script Runner. The single point through which external scripts are launched.
///
/// ARCHITECTURAL RULE: No other module may spawn a process directly.
/// The scorer and the mailer both go through `run_script`.
///
/// Invocation shape: `<interpreter> <script> <args...>`, arguments passed as
/// distinct argv entries (no shell), stdin closed, stdout/stderr captured.
/// Every call is bounded by the configured timeout; the child is killed when
/// the timeout fires or the awaiting future is dropped.
use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::ScriptConfig;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect script output: {0}")]
    Wait(#[source] std::io::Error),

    #[error("script timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("script exited with {status}: {detail}")]
    Failed { status: ExitStatus, detail: String },

    #[error("script output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Captured output of a script that exited successfully.
#[derive(Debug)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// Parses stdout as a single JSON document.
    pub fn json(&self) -> Result<Value, ScriptError> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    /// Trimmed stderr, `None` when the script wrote nothing there.
    pub fn diagnostics(&self) -> Option<&str> {
        let trimmed = self.stderr.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Runs `config.interpreter config.script args...` to completion.
///
/// Returns `ScriptError::Failed` on a non-zero exit. Stderr on a successful
/// exit is returned to the caller, which decides whether it is fatal.
pub async fn run_script<I, S>(config: &ScriptConfig, args: I) -> Result<ScriptOutput, ScriptError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(&config.interpreter);
    command
        .arg(&config.script)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        interpreter = %config.interpreter,
        script = %config.script.display(),
        "Launching script"
    );

    let child = command.spawn().map_err(|source| ScriptError::Spawn {
        program: config.interpreter.clone(),
        source,
    })?;

    let output = match tokio::time::timeout(config.timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(ScriptError::Wait)?,
        // Dropping the wait future drops the child, which kills it.
        Err(_) => return Err(ScriptError::TimedOut(config.timeout)),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(ScriptError::Failed {
            status: output.status,
            detail,
        });
    }

    Ok(ScriptOutput { stdout, stderr })
}
