//! Claude provider
//!
//! Anthropic has no embeddings endpoint, so vectors come from Voyage AI while
//! verification goes to the Anthropic Messages API.

use async_trait::async_trait;
use serde::Deserialize;

use super::compat::parse_embedding;
use super::http_client::HttpClientTrait;
use super::judge::{judge_user_message, parse_verdict, JUDGE_MAX_TOKENS, JUDGE_SYSTEM_PROMPT};
use crate::domain::embedding::{ProviderKind, SemanticProvider};
use crate::domain::DomainError;

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_VOYAGE_BASE_URL: &str = "https://api.voyageai.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_CLAUDE_EMBEDDING_MODEL: &str = "voyage-3";
pub const DEFAULT_CLAUDE_JUDGE_MODEL: &str = "claude-3-haiku-20240307";

/// Claude provider backed by Voyage embeddings
#[derive(Debug)]
pub struct ClaudeProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    voyage_auth_header: Option<String>,
    voyage_base_url: String,
    embedding_model: String,
    judge_model: String,
}

impl<C: HttpClientTrait> ClaudeProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            voyage_auth_header: None,
            voyage_base_url: DEFAULT_VOYAGE_BASE_URL.to_string(),
            embedding_model: DEFAULT_CLAUDE_EMBEDDING_MODEL.to_string(),
            judge_model: DEFAULT_CLAUDE_JUDGE_MODEL.to_string(),
        }
    }

    /// Credentials for the Voyage embeddings API; embedding fails without them
    pub fn with_voyage_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.voyage_auth_header = (!api_key.is_empty()).then(|| format!("Bearer {}", api_key));
        self
    }

    pub fn with_voyage_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.voyage_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_judge_model(mut self, model: impl Into<String>) -> Self {
        self.judge_model = model.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn voyage_url(&self) -> String {
        format!("{}/v1/embeddings", self.voyage_base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> SemanticProvider for ClaudeProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let auth_header = self.voyage_auth_header.as_deref().ok_or_else(|| {
            DomainError::provider("claude", "Voyage API key is required for Claude embeddings")
        })?;

        let body = serde_json::json!({
            "input": [text],
            "model": self.embedding_model,
        });
        let headers = vec![
            ("Authorization", auth_header),
            ("Content-Type", "application/json"),
        ];

        let response = self.client.post_json(&self.voyage_url(), headers, &body).await?;

        parse_embedding("claude", response)
    }

    async fn check_similarity(&self, first: &str, second: &str) -> Result<bool, DomainError> {
        let body = serde_json::json!({
            "model": self.judge_model,
            "max_tokens": JUDGE_MAX_TOKENS,
            "system": JUDGE_SYSTEM_PROMPT,
            "messages": [{"role": "user", "content": judge_user_message(first, second)}],
        });

        let response = self
            .client
            .post_json(&self.messages_url(), self.headers(), &body)
            .await?;

        let response: MessagesResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("claude", format!("Failed to parse response: {}", e))
        })?;

        let block = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("claude", "No content returned"))?;

        Ok(block.text.as_deref().is_some_and(parse_verdict))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
