use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::{ClaudeProvider, MistralProvider, OpenAiProvider};
use crate::config::{ClaudeProviderConfig, ProviderConfig, ProvidersConfig};
use crate::domain::embedding::{ProviderKind, ProviderRegistry, SemanticProvider};
use crate::domain::DomainError;

/// Factory for creating semantic providers from configuration
#[derive(Debug)]
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build a registry holding every supported backend
    ///
    /// Backends without credentials are still registered; their calls fail
    /// with a provider error until a key is configured.
    pub fn registry(
        config: &ProvidersConfig,
        timeout: Option<Duration>,
    ) -> Result<ProviderRegistry, DomainError> {
        let http_client = match timeout {
            Some(timeout) => HttpClient::with_timeout(timeout)?,
            None => HttpClient::new(),
        };

        let mut registry = ProviderRegistry::new();
        for kind in ProviderKind::ALL {
            registry.register(kind, Self::create(kind, config, http_client.clone()));
        }

        Ok(registry)
    }

    /// Create a single provider
    pub fn create(
        kind: ProviderKind,
        config: &ProvidersConfig,
        http_client: HttpClient,
    ) -> Arc<dyn SemanticProvider> {
        match kind {
            ProviderKind::OpenAi => Arc::new(Self::create_openai(&config.openai, http_client)),
            ProviderKind::Mistral => Arc::new(Self::create_mistral(&config.mistral, http_client)),
            ProviderKind::Claude => Arc::new(Self::create_claude(&config.claude, http_client)),
        }
    }

    fn create_openai(config: &ProviderConfig, http_client: HttpClient) -> OpenAiProvider<HttpClient> {
        let mut provider = match &config.base_url {
            Some(base_url) => OpenAiProvider::with_base_url(http_client, &config.api_key, base_url),
            None => OpenAiProvider::new(http_client, &config.api_key),
        };

        if let Some(model) = &config.embedding_model {
            provider = provider.with_embedding_model(model);
        }
        if let Some(model) = &config.judge_model {
            provider = provider.with_judge_model(model);
        }

        provider
    }

    fn create_mistral(config: &ProviderConfig, http_client: HttpClient) -> MistralProvider<HttpClient> {
        let mut provider = match &config.base_url {
            Some(base_url) => MistralProvider::with_base_url(http_client, &config.api_key, base_url),
            None => MistralProvider::new(http_client, &config.api_key),
        };

        if let Some(model) = &config.embedding_model {
            provider = provider.with_embedding_model(model);
        }
        if let Some(model) = &config.judge_model {
            provider = provider.with_judge_model(model);
        }

        provider
    }

    fn create_claude(
        config: &ClaudeProviderConfig,
        http_client: HttpClient,
    ) -> ClaudeProvider<HttpClient> {
        let mut provider = match &config.base_url {
            Some(base_url) => ClaudeProvider::with_base_url(http_client, &config.api_key, base_url),
            None => ClaudeProvider::new(http_client, &config.api_key),
        }
        .with_voyage_api_key(&config.voyage_api_key);

        if let Some(base_url) = &config.voyage_base_url {
            provider = provider.with_voyage_base_url(base_url);
        }
        if let Some(model) = &config.embedding_model {
            provider = provider.with_embedding_model(model);
        }
        if let Some(model) = &config.judge_model {
            provider = provider.with_judge_model(model);
        }

        provider
    }
}
