mod config;
mod errors;
mod evaluation;
mod models;
mod notify;
mod routes;
mod scoring;
mod scratch;
mod script_runner;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::notify::ScriptMailer;
use crate::routes::build_router;
use crate::scoring::ScriptScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumatch API v{}", env!("CARGO_PKG_VERSION"));

    let scorer = Arc::new(ScriptScorer::new(config.scorer.clone()));
    info!(
        interpreter = %config.scorer.interpreter,
        script = %config.scorer.script.display(),
        timeout_secs = config.scorer.timeout.as_secs(),
        "Scorer configured"
    );

    let mailer = Arc::new(ScriptMailer::new(config.mailer.clone()));
    info!(
        interpreter = %config.mailer.interpreter,
        script = %config.mailer.script.display(),
        "Mailer configured"
    );

    info!(
        scratch_root = %config.scratch_root.display(),
        pacing_ms = config.batch_pacing.as_millis() as u64,
        default_threshold = config.default_threshold,
        "Batch evaluation configured"
    );

    let state = AppState::new(config.clone(), scorer, mailer);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
