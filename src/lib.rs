//! Prompt Cache
//!
//! A semantic response cache in front of OpenAI-compatible chat APIs:
//! - Embedding similarity lookup with a three-zone hit/verify/miss decision
//! - Hot-swappable OpenAI, Mistral and Claude embedding/verification backends
//! - In-memory or Redis storage with per-entry TTL

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::TimeDelta;
use tracing::{info, warn};

use api::state::AppState;
use config::StorageConfig;
use domain::semantic::{EmbeddingStore, SemanticEngine};
use infrastructure::cache::{BackendConfig, BackendFactory, KvEmbeddingStore, ResponseCache};
use infrastructure::observability::{CacheMetrics, PrometheusMetrics};
use infrastructure::provider::ProviderFactory;
use infrastructure::services::{PromptCacheService, DEFAULT_RESPONSE_TTL_SECS};
use infrastructure::upstream::UpstreamClient;

/// Create the application state from configuration
pub async fn create_app_state(
    config: &AppConfig,
    prometheus: Option<PrometheusMetrics>,
) -> anyhow::Result<AppState> {
    let backend_config = backend_config(&config.storage)?;
    info!(backend = %backend_config.backend, "Storage backend");

    let backend = BackendFactory::new()
        .create(&backend_config)
        .await
        .context("Failed to create storage backend")?;

    let embeddings = KvEmbeddingStore::new(backend.clone());
    let store: Arc<dyn EmbeddingStore> = Arc::new(embeddings.clone());
    let metrics = Arc::new(CacheMetrics::new(store.clone()));

    let call_timeout = Some(config.semantic.call_timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    let registry = ProviderFactory::registry(&config.providers, call_timeout)?;

    let thresholds = config.semantic.thresholds();
    let mut engine = SemanticEngine::new(registry, &config.semantic.provider, store, thresholds)
        .with_context(|| format!("Invalid semantic provider '{}'", config.semantic.provider))?;
    if let Some(timeout) = call_timeout {
        engine = engine.with_call_timeout(timeout);
    }

    info!(
        provider = %engine.current_provider(),
        high_threshold = thresholds.high_threshold(),
        low_threshold = thresholds.low_threshold(),
        gray_zone_verification = thresholds.gray_zone_verification(),
        "Semantic engine initialized"
    );

    let responses = ResponseCache::new(backend.clone()).with_metrics(metrics.clone());
    let service = PromptCacheService::new(Arc::new(engine), responses, embeddings, metrics)
        .with_ttl(response_ttl(config.cache.ttl_secs));

    let upstream = UpstreamClient::new(&config.upstream)?;

    Ok(AppState::new(Arc::new(service), Arc::new(upstream), backend).with_prometheus(prometheus))
}

fn response_ttl(secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs).unwrap_or_else(|| {
        warn!(ttl_secs = secs, "Cache TTL out of range, using default");
        TimeDelta::seconds(DEFAULT_RESPONSE_TTL_SECS)
    })
}

fn backend_config(storage: &StorageConfig) -> anyhow::Result<BackendConfig> {
    let mut config = BackendConfig {
        backend: storage.backend.parse()?,
        redis_url: storage.redis_url.clone(),
        key_prefix: None,
    };

    if let Some(prefix) = storage.key_prefix.as_ref() {
        config = config.with_key_prefix(prefix.clone());
    }

    Ok(config)
}
