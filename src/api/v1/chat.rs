//! Chat completions endpoint: serve from the cache or forward upstream

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatCompletionRequest};

/// Reports whether the response came from the cache
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-prompt-cache");

const NO_USER_PROMPT: &str = "No user prompt found";

/// POST /v1/chat/completions
pub async fn create_chat_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let prompt = serde_json::from_slice::<ChatCompletionRequest>(&body)
        .ok()
        .and_then(|request| request.last_user_prompt())
        .ok_or_else(|| ApiError::bad_request(NO_USER_PROMPT).with_param("messages"))?;

    match state.service.lookup(&prompt).await {
        Ok(Some(hit)) => {
            info!(
                key = %hit.key,
                score = hit.score,
                decision = ?hit.decision,
                "Serving cached response"
            );
            return Ok(relay(StatusCode::OK, Bytes::from(hit.payload), "hit"));
        }
        Ok(None) => debug!("Cache miss, forwarding upstream"),
        Err(e) => warn!(error = %e, "Cache lookup failed, forwarding upstream"),
    }

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let response = state
        .upstream
        .forward_chat(body, authorization)
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;

    if response.is_success() {
        if let Err(e) = state.service.store(&prompt, &response.body).await {
            warn!(error = %e, "Failed to cache upstream response");
        }
    } else {
        debug!(status = response.status, "Upstream returned an error, not caching");
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(relay(status, response.body, "miss"))
}

fn relay(status: StatusCode, body: Bytes, cache_status: &'static str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (CACHE_STATUS_HEADER, HeaderValue::from_static(cache_status)),
        ],
        body,
    )
        .into_response()
}
