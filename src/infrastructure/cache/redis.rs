//! Redis key/value backend

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::KvBackend;
use crate::domain::DomainError;

const SCAN_BATCH: usize = 500;

/// Configuration for the Redis backend
#[derive(Debug, Clone)]
pub struct RedisBackendConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Namespace prepended to every key as `<prefix>:<key>`
    pub key_prefix: Option<String>,
}

impl Default for RedisBackendConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisBackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Durable backend over a shared Redis connection manager
#[derive(Clone)]
pub struct RedisBackend {
    connection: ConnectionManager,
    config: RedisBackendConfig,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisBackend {
    pub async fn new(config: RedisBackendConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        prefixed(self.config.key_prefix.as_deref(), key)
    }

    fn unprefix_key<'a>(&self, key: &'a str) -> &'a str {
        unprefixed(self.config.key_prefix.as_deref(), key)
    }

    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let pattern = format!("{}*", escape_glob(&self.prefix_key(prefix)));
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to scan prefix '{}': {}", prefix, e))
                })?;

            keys.extend(batch);
            cursor = next;

            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: () = conn
            .set(self.prefix_key(key), value)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.connection.clone();

        conn.get(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let deleted: i64 = conn
            .del(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>, DomainError> {
        let keys = self.scan_keys(prefix).await?;
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut conn = self.connection.clone();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to read prefix '{}': {}", prefix, e))
            })?;

        // Keys deleted between SCAN and MGET come back as nil
        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|v| (self.unprefix_key(key).to_string(), v)))
            .collect())
    }

    async fn count_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        Ok(self.scan_keys(prefix).await?.len())
    }
}

fn prefixed(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        Some(namespace) => format!("{}:{}", namespace, key),
        None => key.to_string(),
    }
}

fn unprefixed<'a>(namespace: Option<&str>, key: &'a str) -> &'a str {
    namespace
        .and_then(|namespace| key.strip_prefix(namespace))
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(key)
}

/// Escapes Redis glob metacharacters so a literal prefix can be used in MATCH
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
