pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::history::handlers as history;
use crate::state::AppState;

/// Resumes larger than this are rejected before extraction.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/analyze/heuristic", post(analysis::handle_heuristic))
        // History
        .route(
            "/api/v1/history",
            get(history::handle_list).delete(history::handle_clear),
        )
        .route(
            "/api/v1/history/:id",
            get(history::handle_get).delete(history::handle_delete),
        )
        .route(
            "/api/v1/history/:id/thumbnail",
            get(history::handle_thumbnail),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
