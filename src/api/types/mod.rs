//! OpenAI-compatible API types

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatCompletionRequest, ChatMessage, ContentPart, MessageContent};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
