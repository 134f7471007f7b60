//! Wire types for OpenAI-style embedding and chat completion endpoints
//!
//! OpenAI, Mistral and Voyage share the embeddings shape; OpenAI and Mistral
//! share the chat completions shape used for verification.

use serde::{Deserialize, Serialize};

use super::judge::{judge_user_message, parse_verdict, JUDGE_SYSTEM_PROMPT};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// First embedding in an OpenAI-style embeddings response
pub fn parse_embedding(provider: &str, json: serde_json::Value) -> Result<Vec<f32>, DomainError> {
    let response: EmbeddingResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::provider(provider, format!("Failed to parse embedding response: {}", e))
    })?;

    response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|embedding| !embedding.is_empty())
        .ok_or_else(|| DomainError::provider(provider, "No embedding data returned"))
}

/// Chat completion body asking the judge model for a verdict
pub fn judge_request(model: &str, first: &str, second: &str) -> serde_json::Value {
    let user = judge_user_message(first, second);

    serde_json::json!({
        "model": model,
        "messages": [
            ChatMessage { role: "system", content: JUDGE_SYSTEM_PROMPT },
            ChatMessage { role: "user", content: &user },
        ],
    })
}

/// Verdict from the first choice of a chat completion response
pub fn parse_judge_response(provider: &str, json: serde_json::Value) -> Result<bool, DomainError> {
    let response: ChatResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::provider(provider, format!("Failed to parse verification response: {}", e))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::provider(provider, "No choices returned"))?;

    Ok(choice
        .message
        .content
        .as_deref()
        .is_some_and(parse_verdict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding_takes_first() {
        let json = serde_json::json!({
            "data": [{"embedding": [0.5, 0.25]}, {"embedding": [1.0, 1.0]}]
        });

        assert_eq!(parse_embedding("openai", json).unwrap(), vec![0.5, 0.25]);
    }

    #[test]
    fn test_parse_embedding_empty_data_is_error() {
        let json = serde_json::json!({ "data": [] });

        let result = parse_embedding("openai", json);

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[test]
    fn test_parse_embedding_malformed_is_error() {
        let json = serde_json::json!({ "data": [{"embedding": "nope"}] });

        assert!(parse_embedding("mistral", json).is_err());
    }

    #[test]
    fn test_judge_request_shape() {
        let body = judge_request("gpt-4o-mini", "a", "b");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], JUDGE_SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Prompt 1: a\nPrompt 2: b");
    }

    #[test]
    fn test_parse_judge_response() {
        let yes = serde_json::json!({"choices": [{"message": {"role": "assistant", "content": "YES"}}]});
        let no = serde_json::json!({"choices": [{"message": {"role": "assistant", "content": "NO"}}]});
        let null = serde_json::json!({"choices": [{"message": {"role": "assistant", "content": null}}]});

        assert!(parse_judge_response("openai", yes).unwrap());
        assert!(!parse_judge_response("openai", no).unwrap());
        assert!(!parse_judge_response("openai", null).unwrap());
    }

    #[test]
    fn test_parse_judge_response_without_choices_is_error() {
        let json = serde_json::json!({ "choices": [] });

        assert!(matches!(
            parse_judge_response("openai", json),
            Err(DomainError::Provider { .. })
        ));
    }
}
