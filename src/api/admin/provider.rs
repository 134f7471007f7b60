//! Active provider inspection and hot swap

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

/// Current provider and the names it can be switched to
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResponse {
    pub provider: String,
    pub available: Vec<String>,
}

/// Request to switch the active provider
#[derive(Debug, Clone, Deserialize)]
pub struct SetProviderRequest {
    pub provider: String,
}

fn provider_response(state: &AppState) -> ProviderResponse {
    let engine = state.engine();

    ProviderResponse {
        provider: engine.current_provider().to_string(),
        available: engine
            .available_providers()
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

/// GET /admin/provider
pub async fn get_provider(State(state): State<AppState>) -> Json<ProviderResponse> {
    Json(provider_response(&state))
}

/// PUT /admin/provider
pub async fn set_provider(
    State(state): State<AppState>,
    Json(request): Json<SetProviderRequest>,
) -> Result<Json<ProviderResponse>, ApiError> {
    state.engine().set_provider(&request.provider)?;

    info!(provider = %request.provider, "Provider switched via admin API");
    Ok(Json(provider_response(&state)))
}
