//! Request-scoped scratch directories.
//!
//! A `ScratchArea` is created at the start of a request and removed when it is
//! dropped, on every exit path. Removal failures are logged, never returned.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ScratchArea {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl ScratchArea {
    /// Creates a uniquely named directory `resumatch-<micros>-<random>` under `root`.
    /// `root` itself is created when missing.
    pub async fn create(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;

        let prefix = format!("resumatch-{}-", Utc::now().timestamp_micros());
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;
        let path = dir.path().to_path_buf();

        debug!(path = %path.display(), "Created scratch area");
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file named `name` inside this area.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Best-effort removal of one file inside the area.
    pub async fn discard(&self, file: &Path) {
        if let Err(e) = tokio::fs::remove_file(file).await {
            warn!(path = %file.display(), error = %e, "Failed to delete scratch file");
        }
    }
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch area"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch area"
            ),
        }
    }
}
