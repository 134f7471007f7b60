//! OpenAI-compatible chat completion request, read only as far as the cache needs

use serde::{Deserialize, Serialize};

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Message content: plain text or a list of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text of the message; text parts are joined with newlines
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Other => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A chat message in OpenAI format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Chat completion request
///
/// Only the messages are read; the raw body is forwarded upstream untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// Text of the last `user` message; `None` when it has no text
    pub fn last_user_prompt(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == "user")
            .and_then(|message| message.content.as_ref().map(MessageContent::text))
            .filter(|text| !text.trim().is_empty())
    }
}
