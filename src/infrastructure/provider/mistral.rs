//! Mistral provider: embeddings and chat-completion verification

use async_trait::async_trait;

use super::compat::{judge_request, parse_embedding, parse_judge_response};
use super::http_client::HttpClientTrait;
use crate::domain::embedding::{ProviderKind, SemanticProvider};
use crate::domain::DomainError;

const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MISTRAL_EMBEDDING_MODEL: &str = "mistral-embed";
pub const DEFAULT_MISTRAL_JUDGE_MODEL: &str = "mistral-small-latest";

/// Mistral provider
#[derive(Debug)]
pub struct MistralProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    embedding_model: String,
    judge_model: String,
}

impl<C: HttpClientTrait> MistralProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_MISTRAL_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: DEFAULT_MISTRAL_EMBEDDING_MODEL.to_string(),
            judge_model: DEFAULT_MISTRAL_JUDGE_MODEL.to_string(),
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

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> SemanticProvider for MistralProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mistral
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = serde_json::json!({
            "input": [text],
            "model": self.embedding_model,
            "encoding_format": "float",
        });

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        parse_embedding("mistral", response)
    }

    async fn check_similarity(&self, first: &str, second: &str) -> Result<bool, DomainError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = judge_request(&self.judge_model, first, second);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        parse_judge_response("mistral", response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::provider::http_client::mock::MockHttpClient;

    const EMBEDDINGS_URL: &str = "https://api.mistral.ai/v1/embeddings";
    const CHAT_URL: &str = "https://api.mistral.ai/v1/chat/completions";

    #[tokio::test]
    async fn test_embed_sends_batch_input_as_float() {
        let client = MockHttpClient::new().with_response(
            EMBEDDINGS_URL,
            serde_json::json!({
                "id": "emb-1",
                "model": "mistral-embed",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.5, -0.5]}]
            }),
        );
        let provider = MistralProvider::new(client, "mistral-key");

        assert_eq!(provider.embed("bonjour").await.unwrap(), vec![0.5, -0.5]);

        let request = provider.client.last_request().unwrap();
        assert_eq!(request.body["input"], serde_json::json!(["bonjour"]));
        assert_eq!(request.body["model"], "mistral-embed");
        assert_eq!(request.body["encoding_format"], "float");
        assert_eq!(request.header("Authorization"), Some("Bearer mistral-key"));
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(EMBEDDINGS_URL, "HTTP 500");
        let provider = MistralProvider::new(client, "mistral-key");

        assert!(matches!(
            provider.embed("bonjour").await,
            Err(DomainError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_similarity() {
        let client = MockHttpClient::new().with_response(
            CHAT_URL,
            serde_json::json!({"choices": [{"message": {"role": "assistant", "content": "NO"}}]}),
        );
        let provider = MistralProvider::new(client, "mistral-key");

        assert!(!provider.check_similarity("a", "b").await.unwrap());
        assert_eq!(
            provider.client.last_request().unwrap().body["model"],
            DEFAULT_MISTRAL_JUDGE_MODEL
        );
    }

    #[tokio::test]
    async fn test_check_similarity_error_propagates() {
        let client = MockHttpClient::new().with_error(CHAT_URL, "HTTP 429");
        let provider = MistralProvider::new(client, "mistral-key");

        assert!(provider.check_similarity("a", "b").await.is_err());
    }
}
