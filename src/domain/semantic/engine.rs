//! Semantic engine
//!
//! Decides whether a prompt is equivalent to one already answered. The query
//! is embedded with the active provider, compared against every stored vector,
//! and the best score is classified into three zones:
//!
//! - `score >= high` is a hit without further checks
//! - `score < low` is a miss
//! - anything in between is sent to the provider's judge when gray-zone
//!   verification is enabled, and treated as a miss otherwise
//!
//! The active provider can be replaced at any time. Each lookup captures one
//! provider snapshot up front and uses it for both embedding and verification.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{EmbeddingStore, ThresholdConfig};
use crate::domain::cache::strip_embedding_prefix;
use crate::domain::embedding::{
    cosine_similarity, decode, ProviderKind, ProviderRegistry, SemanticProvider,
};
use crate::domain::DomainError;

/// How a lookup was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// Best score at or above the high threshold
    DefiniteHit,
    /// Gray-zone score confirmed by the provider's judge
    VerifiedHit,
    /// Best score below the low threshold
    DefiniteMiss,
    /// Gray-zone score with verification disabled
    GrayZoneSkipped,
    /// Gray-zone score rejected by the provider's judge
    VerificationRejected,
    /// Gray-zone score whose original prompt could not be recovered
    Unverifiable,
    /// No comparable vectors stored
    NoCandidates,
}

impl MatchDecision {
    pub fn is_hit(&self) -> bool {
        matches!(self, MatchDecision::DefiniteHit | MatchDecision::VerifiedHit)
    }
}

/// Outcome of [`SemanticEngine::find_similar`]
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    key: Option<String>,
    score: f32,
    decision: MatchDecision,
}

impl SimilarityMatch {
    fn hit(key: String, score: f32, decision: MatchDecision) -> Self {
        Self {
            key: Some(key),
            score,
            decision,
        }
    }

    fn miss(score: f32, decision: MatchDecision) -> Self {
        Self {
            key: None,
            score,
            decision,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.key.is_some()
    }

    /// Matched embedding-index key, still carrying the `emb:` prefix
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Matched key with the embedding prefix stripped, usable against the response cache
    pub fn cache_key(&self) -> Option<&str> {
        self.key.as_deref().map(strip_embedding_prefix)
    }

    /// Best similarity observed, reported for hits and misses alike
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn decision(&self) -> MatchDecision {
        self.decision
    }
}

#[derive(Clone)]
struct ActiveProvider {
    kind: ProviderKind,
    provider: Arc<dyn SemanticProvider>,
}

/// Similarity search and threshold policy over the stored embedding index
pub struct SemanticEngine {
    active: RwLock<ActiveProvider>,
    registry: ProviderRegistry,
    store: Arc<dyn EmbeddingStore>,
    thresholds: ThresholdConfig,
    call_timeout: Option<Duration>,
}

impl SemanticEngine {
    /// Create an engine with `initial_provider` active
    pub fn new(
        registry: ProviderRegistry,
        initial_provider: &str,
        store: Arc<dyn EmbeddingStore>,
        thresholds: ThresholdConfig,
    ) -> Result<Self, DomainError> {
        let (kind, provider) = registry.resolve(initial_provider)?;

        Ok(Self {
            active: RwLock::new(ActiveProvider { kind, provider }),
            registry,
            store,
            thresholds,
            call_timeout: None,
        })
    }

    /// Bound every lookup by a deadline `timeout` after it starts
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.registry.kinds()
    }

    /// Replace the active provider for both embedding and verification
    ///
    /// Unknown names leave the current provider in place.
    pub fn set_provider(&self, name: &str) -> Result<(), DomainError> {
        let (kind, provider) = self.registry.resolve(name)?;

        let previous = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            let previous = active.kind;
            *active = ActiveProvider { kind, provider };
            previous
        };

        info!(from = %previous, to = %kind, "Switched semantic provider");
        Ok(())
    }

    pub fn current_provider(&self) -> ProviderKind {
        self.snapshot().kind
    }

    fn snapshot(&self) -> ActiveProvider {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn deadline(&self) -> Option<Instant> {
        self.call_timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Embed text with the active provider
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let active = self.snapshot();
        let kind = active.kind;

        with_deadline(self.deadline(), active.provider.embed(text), || {
            DomainError::provider(kind.as_str(), "embedding deadline exceeded")
        })
        .await
    }

    /// Look for a stored prompt equivalent to `query`
    pub async fn find_similar(&self, query: &str) -> Result<SimilarityMatch, DomainError> {
        self.find_similar_until(query, self.deadline()).await
    }

    /// Like [`find_similar`](Self::find_similar) with a caller-supplied deadline
    pub async fn find_similar_until(
        &self,
        query: &str,
        deadline: Option<Instant>,
    ) -> Result<SimilarityMatch, DomainError> {
        let active = self.snapshot();
        let kind = active.kind;

        let query_vector = with_deadline(deadline, active.provider.embed(query), || {
            DomainError::provider(kind.as_str(), "embedding deadline exceeded")
        })
        .await?;

        let stored = with_deadline(deadline, self.store.get_all_embeddings(), || {
            DomainError::storage("embedding index read deadline exceeded")
        })
        .await?;

        let Some((best_key, best_score)) = best_match(&query_vector, &stored) else {
            debug!(provider = %kind, stored = stored.len(), "No comparable embeddings");
            return Ok(SimilarityMatch::miss(0.0, MatchDecision::NoCandidates));
        };

        if best_score >= self.thresholds.high_threshold() {
            debug!(provider = %kind, key = %best_key, score = best_score, "Semantic hit");
            return Ok(SimilarityMatch::hit(best_key, best_score, MatchDecision::DefiniteHit));
        }

        if best_score < self.thresholds.low_threshold() {
            debug!(provider = %kind, score = best_score, "Semantic miss");
            return Ok(SimilarityMatch::miss(best_score, MatchDecision::DefiniteMiss));
        }

        if !self.thresholds.gray_zone_verification() {
            debug!(score = best_score, "Gray zone with verification disabled");
            return Ok(SimilarityMatch::miss(best_score, MatchDecision::GrayZoneSkipped));
        }

        let hash = strip_embedding_prefix(&best_key);
        let lookup = with_deadline(deadline, self.store.get_prompt_by_hash(hash), || {
            DomainError::storage("prompt lookup deadline exceeded")
        });

        let original = match lookup.await {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(key = %best_key, error = %e, "Cannot recover original prompt, treating as miss");
                return Ok(SimilarityMatch::miss(best_score, MatchDecision::Unverifiable));
            }
        };

        let same = with_deadline(
            deadline,
            active.provider.check_similarity(query, &original),
            || DomainError::provider(kind.as_str(), "verification deadline exceeded"),
        )
        .await?;

        debug!(provider = %kind, key = %best_key, score = best_score, same, "Gray zone verified");

        if same {
            Ok(SimilarityMatch::hit(best_key, best_score, MatchDecision::VerifiedHit))
        } else {
            Ok(SimilarityMatch::miss(best_score, MatchDecision::VerificationRejected))
        }
    }
}

impl std::fmt::Debug for SemanticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticEngine")
            .field("provider", &self.current_provider())
            .field("registry", &self.registry)
            .field("thresholds", &self.thresholds)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Highest-scoring stored vector; on exact ties the first key in order wins
fn best_match(query: &[f32], stored: &BTreeMap<String, Vec<u8>>) -> Option<(String, f32)> {
    let mut best: Option<(&str, f32)> = None;

    for (key, bytes) in stored {
        let vector = decode(bytes);

        let score = match cosine_similarity(query, &vector) {
            Ok(score) if !score.is_nan() => score,
            Ok(_) => continue,
            Err(e) => {
                debug!(key = %key, error = %e, "Skipping incomparable embedding");
                continue;
            }
        };

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((key, score));
        }
    }

    best.map(|(key, score)| (key.to_string(), score))
}

async fn with_deadline<T, F, E>(deadline: Option<Instant>, call: F, on_timeout: E) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
    E: FnOnce() -> DomainError,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, call)
            .await
            .map_err(|_| on_timeout())?,
        None => call.await,
    }
}
