//! OpenAI-compatible v1 API endpoints

pub mod chat;

use axum::{routing::post, Router};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/chat/completions", post(chat::create_chat_completion))
}
