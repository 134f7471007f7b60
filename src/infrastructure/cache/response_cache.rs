//! Response store keyed by prompt hash, with lazy TTL expiry

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, warn};

use crate::domain::cache::{CacheEntry, KvBackend};
use crate::domain::DomainError;
use crate::infrastructure::observability::CacheMetrics;

/// Stores serialized [`CacheEntry`] records under the bare prompt hash
///
/// Expired records are discarded when read; there is no background sweep.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    backend: Arc<dyn KvBackend>,
    metrics: Option<Arc<CacheMetrics>>,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            metrics: None,
        }
    }

    /// Report read-time expiries as evictions
    pub fn with_metrics(mut self, metrics: Arc<CacheMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Store a payload; a zero TTL never expires
    pub async fn set(&self, key: &str, payload: &[u8], ttl: TimeDelta) -> Result<(), DomainError> {
        let entry = CacheEntry::new(payload, ttl);
        self.backend.set(key, &entry.to_bytes()?).await
    }

    /// Read a live payload
    ///
    /// Absent and expired entries both read as `None`. Records that fail to
    /// deserialize are reported as `DataCorruption`.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let Some(bytes) = self.backend.get(key).await? else {
            return Ok(None);
        };

        let entry = CacheEntry::from_bytes(&bytes)?;

        if entry.is_expired() {
            debug!(key = %key, created_at = %entry.creation_time(), "Cache entry expired");

            if let Err(e) = self.backend.delete(key).await {
                warn!(key = %key, error = %e, "Failed to delete expired cache entry");
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_eviction();
            }

            return Ok(None);
        }

        Ok(Some(entry.into_payload()))
    }
}
