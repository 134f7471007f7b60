//! Prompt cache service
//!
//! Caller-side flow around the semantic engine: resolve a lookup to a stored
//! response, and persist the response, prompt and embedding after a miss.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::debug;

use crate::domain::cache::derive_key;
use crate::domain::semantic::{MatchDecision, SemanticEngine};
use crate::domain::DomainError;
use crate::infrastructure::cache::{KvEmbeddingStore, ResponseCache};
use crate::infrastructure::observability::CacheMetrics;

/// Default lifetime of stored responses, in seconds
pub const DEFAULT_RESPONSE_TTL_SECS: i64 = 86_400;

/// A stored response served for a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    /// Response-cache key of the matched prompt
    pub key: String,
    pub score: f32,
    pub decision: MatchDecision,
    pub payload: Vec<u8>,
}

/// Lookup and store operations over the engine and its stores
#[derive(Debug)]
pub struct PromptCacheService {
    engine: Arc<SemanticEngine>,
    responses: ResponseCache,
    embeddings: KvEmbeddingStore,
    metrics: Arc<CacheMetrics>,
    ttl: TimeDelta,
}

impl PromptCacheService {
    pub fn new(
        engine: Arc<SemanticEngine>,
        responses: ResponseCache,
        embeddings: KvEmbeddingStore,
        metrics: Arc<CacheMetrics>,
    ) -> Self {
        Self {
            engine,
            responses,
            embeddings,
            metrics,
            ttl: TimeDelta::seconds(DEFAULT_RESPONSE_TTL_SECS),
        }
    }

    /// TTL for responses written by [`store`](Self::store); zero never expires
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn engine(&self) -> &Arc<SemanticEngine> {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Find a stored response for an equivalent prompt
    ///
    /// A match whose response has expired or vanished counts as a miss.
    /// Errors are returned after the miss is recorded.
    pub async fn lookup(&self, prompt: &str) -> Result<Option<CacheHit>, DomainError> {
        let result = self.resolve(prompt).await;

        match &result {
            Ok(Some(_)) => self.metrics.record_hit(),
            _ => self.metrics.record_miss(),
        }

        result
    }

    async fn resolve(&self, prompt: &str) -> Result<Option<CacheHit>, DomainError> {
        let found = self.engine.find_similar(prompt).await?;

        let Some(key) = found.cache_key() else {
            return Ok(None);
        };

        match self.responses.get(key).await? {
            Some(payload) => Ok(Some(CacheHit {
                key: key.to_string(),
                score: found.score(),
                decision: found.decision(),
                payload,
            })),
            None => {
                debug!(key = %key, score = found.score(), "Matched prompt has no live response");
                Ok(None)
            }
        }
    }

    /// Persist a response for `prompt`, returning its cache key
    ///
    /// The embedding comes from the provider active at the time of the call.
    pub async fn store(&self, prompt: &str, payload: &[u8]) -> Result<String, DomainError> {
        let key = derive_key(prompt);

        self.responses.set(&key, payload, self.ttl).await?;
        self.embeddings.save_prompt(&key, prompt).await?;

        let vector = self.engine.embed(prompt).await?;
        self.embeddings.save_embedding(&key, &vector).await?;

        debug!(key = %key, dimensions = vector.len(), "Stored response");
        Ok(key)
    }
}
