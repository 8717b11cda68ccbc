use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::single::SingleUploadSlot;
use crate::notify::Mailer;
use crate::scoring::ResumeScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable resume scorer. Default: ScriptScorer.
    pub scorer: Arc<dyn ResumeScorer>,
    /// Pluggable mailer. Default: ScriptMailer.
    pub mailer: Arc<dyn Mailer>,
    /// Fixed upload path for `/evaluate`, shared by all requests.
    pub single_upload: Arc<SingleUploadSlot>,
}

impl AppState {
    pub fn new(config: Config, scorer: Arc<dyn ResumeScorer>, mailer: Arc<dyn Mailer>) -> Self {
        let single_upload = Arc::new(SingleUploadSlot::new(&config.single_upload_dir));
        Self {
            config,
            scorer,
            mailer,
            single_upload,
        }
    }
}
