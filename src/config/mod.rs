//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, ClaudeProviderConfig, LogFormat, LoggingConfig, MetricsConfig,
    ProviderConfig, ProvidersConfig, SemanticConfig, ServerConfig, StorageConfig, UpstreamConfig,
};
