use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scorer: ScriptConfig,
    pub mailer: ScriptConfig,
    /// Parent directory for request-scoped scratch areas.
    pub scratch_root: PathBuf,
    /// Fixed location of the single-resume upload (`<dir>/resume.pdf`).
    pub single_upload_dir: PathBuf,
    /// Delay between consecutive scorer invocations within one batch.
    pub batch_pacing: Duration,
    pub default_threshold: i64,
    pub max_upload_bytes: usize,
}

/// How to launch one external script: `<interpreter> <script> <args...>`.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    pub interpreter: String,
    pub script: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scorer: ScriptConfig {
                interpreter: env_or("SCORER_INTERPRETER", default_interpreter()),
                script: env_or("SCORER_SCRIPT", "scripts/evaluate_resume.py").into(),
                timeout: Duration::from_secs(parse_env("SCORER_TIMEOUT_SECS", 60)?),
            },
            mailer: ScriptConfig {
                interpreter: env_or("MAILER_INTERPRETER", default_interpreter()),
                script: env_or("MAILER_SCRIPT", "scripts/send_emails.py").into(),
                timeout: Duration::from_secs(parse_env("MAILER_TIMEOUT_SECS", 60)?),
            },
            scratch_root: std::env::var("SCRATCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            single_upload_dir: env_or("SINGLE_UPLOAD_DIR", "temp").into(),
            batch_pacing: Duration::from_millis(parse_env("BATCH_PACING_MS", 500)?),
            default_threshold: parse_env("DEFAULT_THRESHOLD", 70)?,
            max_upload_bytes: parse_env::<usize>("MAX_UPLOAD_MB", 50)? * 1024 * 1024,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults suitable for tests: everything on disk lives under `root`,
    /// no pacing.
    pub fn for_tests(root: &std::path::Path) -> Self {
        let script = |name: &str| ScriptConfig {
            interpreter: "sh".to_string(),
            script: root.join(name),
            timeout: Duration::from_secs(10),
        };
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            scorer: script("score.sh"),
            mailer: script("mail.sh"),
            scratch_root: root.join("scratch"),
            single_upload_dir: root.join("uploads"),
            batch_pacing: Duration::ZERO,
            default_threshold: 70,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Windows installs usually expose `python`, Unix-likes `python3`.
fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
