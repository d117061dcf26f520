pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis/review", post(handlers::handle_review))
        .route("/api/v1/analysis/match", post(handlers::handle_match))
        .layer(upload_limit)
        .with_state(state)
}
