//! OpenAI provider: embeddings and chat-completion verification

use async_trait::async_trait;

use super::compat::{judge_request, parse_embedding, parse_judge_response};
use super::http_client::HttpClientTrait;
use crate::domain::embedding::{ProviderKind, SemanticProvider};
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_JUDGE_MODEL: &str = "gpt-4o-mini";

/// OpenAI provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    embedding_model: String,
    judge_model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            embedding_model: DEFAULT_OPENAI_EMBEDDING_MODEL.to_string(),
            judge_model: DEFAULT_OPENAI_JUDGE_MODEL.to_string(),
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_judge_model(mut self, model: impl Into<String>) -> Self {
        self.judge_model = model.into();
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> SemanticProvider for OpenAiProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "input": text,
            "model": self.embedding_model,
        });

        let response = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await?;

        parse_embedding("openai", response)
    }

    async fn check_similarity(&self, first: &str, second: &str) -> Result<bool, DomainError> {
        let body = judge_request(&self.judge_model, first, second);

        let response = self
            .client
            .post_json(&self.chat_url(), self.headers(), &body)
            .await?;

        parse_judge_response("openai", response)
    }
}
