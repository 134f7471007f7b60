//! Cache counters as JSON

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::observability::MetricsSnapshot;

/// GET /admin/metrics
pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<MetricsSnapshot>, ApiError> {
    let snapshot = state.metrics().snapshot().await?;
    Ok(Json(snapshot))
}
