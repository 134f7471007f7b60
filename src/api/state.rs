//! Application state shared by the handlers

use std::sync::Arc;

use crate::domain::cache::KvBackend;
use crate::domain::semantic::SemanticEngine;
use crate::infrastructure::observability::{CacheMetrics, PrometheusMetrics};
use crate::infrastructure::services::PromptCacheService;
use crate::infrastructure::upstream::UpstreamClient;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PromptCacheService>,
    pub upstream: Arc<UpstreamClient>,
    pub backend: Arc<dyn KvBackend>,
    pub prometheus: Option<PrometheusMetrics>,
}

impl AppState {
    pub fn new(
        service: Arc<PromptCacheService>,
        upstream: Arc<UpstreamClient>,
        backend: Arc<dyn KvBackend>,
    ) -> Self {
        Self {
            service,
            upstream,
            backend,
            prometheus: None,
        }
    }

    /// Serve Prometheus text on `/metrics`
    pub fn with_prometheus(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    pub fn engine(&self) -> &Arc<SemanticEngine> {
        self.service.engine()
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        self.service.metrics()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("upstream", &self.upstream)
            .field("backend", &self.backend)
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}
