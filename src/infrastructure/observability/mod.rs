//! Observability infrastructure - cache counters and Prometheus export

mod metrics;

pub use metrics::{init_metrics, CacheMetrics, MetricsSnapshot, PrometheusMetrics};
