pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::notify::handlers as notify_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation API
        .route("/evaluate", post(handlers::handle_evaluate))
        .route(
            "/evaluate-multiple",
            post(handlers::handle_evaluate_multiple),
        )
        // Notification API
        .route("/send-emails", post(notify_handlers::handle_send_emails))
        .layer(body_limit)
        .with_state(state)
}
