//! Cache counters and the Prometheus exporter

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;

use crate::config::MetricsConfig;
use crate::domain::semantic::EmbeddingStore;
use crate::domain::DomainError;

/// Prometheus metrics handle for serving the /metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

/// Install the Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("prompt_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Point-in-time view of the cache counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub eviction_count: u64,
    pub stored_vectors_count: usize,
    pub hit_rate: f64,
}

/// Increment-only hit, miss and eviction counters
///
/// Every increment is also forwarded to the installed `metrics` recorder.
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    store: Arc<dyn EmbeddingStore>,
}

impl CacheMetrics {
    /// The store answers the stored-vector count
    pub fn new(store: Arc<dyn EmbeddingStore>) -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            store,
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("prompt_cache_hits_total").increment(1);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("prompt_cache_misses_total").increment(1);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!("prompt_cache_evictions_total").increment(1);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// hits / (hits + misses), 0 before any traffic
    pub fn hit_rate(&self) -> f64 {
        rate(self.hits(), self.misses())
    }

    pub async fn stored_vectors_count(&self) -> Result<usize, DomainError> {
        self.store.count_embeddings().await
    }

    pub async fn snapshot(&self) -> Result<MetricsSnapshot, DomainError> {
        let stored_vectors_count = self.stored_vectors_count().await?;
        let cache_hits = self.hits();
        let cache_misses = self.misses();

        gauge!("prompt_cache_stored_vectors").set(stored_vectors_count as f64);

        Ok(MetricsSnapshot {
            cache_hits,
            cache_misses,
            eviction_count: self.evictions(),
            stored_vectors_count,
            hit_rate: rate(cache_hits, cache_misses),
        })
    }
}

impl std::fmt::Debug for CacheMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheMetrics")
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .field("evictions", &self.evictions())
            .finish_non_exhaustive()
    }
}

fn rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
