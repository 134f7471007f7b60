//! Admin API endpoints for the running cache

pub mod metrics;
pub mod provider;

use axum::{routing::get, Router};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/provider",
            get(provider::get_provider).put(provider::set_provider),
        )
        .route("/metrics", get(metrics::get_metrics))
}
