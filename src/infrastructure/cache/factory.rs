//! Backend factory for runtime selection

use std::sync::Arc;

use crate::domain::cache::KvBackend;
use crate::domain::DomainError;

use super::in_memory::InMemoryBackend;
use super::redis::{RedisBackend, RedisBackendConfig};

/// Supported key/value backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendType {
    /// Process-local map, lost on restart
    #[default]
    InMemory,
    /// Redis server
    Redis,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::InMemory => write!(f, "in_memory"),
            BackendType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(BackendType::InMemory),
            "redis" => Ok(BackendType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage backend: {}. Valid backends: in_memory, redis",
                s
            ))),
        }
    }
}

/// Selection and connection settings for the key/value backend
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub backend: BackendType,
    /// Required for the Redis backend
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: BackendType::Redis,
            redis_url: Some(url.into()),
            key_prefix: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Factory for creating key/value backends
#[derive(Debug, Default)]
pub struct BackendFactory;

impl BackendFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the configured backend, connecting to Redis when selected
    pub async fn create(&self, config: &BackendConfig) -> Result<Arc<dyn KvBackend>, DomainError> {
        match config.backend {
            BackendType::InMemory => Ok(Arc::new(InMemoryBackend::new())),
            BackendType::Redis => {
                let url = config
                    .redis_url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        DomainError::configuration("Redis URL is required for the redis backend")
                    })?;

                let mut redis_config = RedisBackendConfig::new(url);

                if let Some(prefix) = config.key_prefix.as_ref().filter(|p| !p.is_empty()) {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                Ok(Arc::new(RedisBackend::new(redis_config).await?))
            }
        }
    }
}
