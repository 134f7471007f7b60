//! In-memory key/value backend

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::cache::KvBackend;
use crate::domain::DomainError;

/// Process-local backend for development and tests
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for InMemoryBackend {
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DomainError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>, DomainError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn count_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|key| key.starts_with(prefix))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = InMemoryBackend::new();

        backend.set("key1", b"value1").await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), Some(b"value1".to_vec()));
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let backend = InMemoryBackend::new();

        backend.set("key1", b"old").await.unwrap();
        backend.set("key1", b"new").await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = InMemoryBackend::new();
        backend.set("key1", b"value1").await.unwrap();

        assert!(backend.delete("key1").await.unwrap());
        assert!(!backend.delete("key1").await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_scan_prefix_is_ordered_and_filtered() {
        let backend = InMemoryBackend::new();
        backend.set("emb:b", b"2").await.unwrap();
        backend.set("prompt:a", b"x").await.unwrap();
        backend.set("emb:a", b"1").await.unwrap();
        backend.set("a", b"entry").await.unwrap();

        let scanned = backend.scan_prefix("emb:").await.unwrap();

        let keys: Vec<&str> = scanned.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["emb:a", "emb:b"]);
        assert_eq!(backend.count_prefix("emb:").await.unwrap(), 2);
        assert_eq!(backend.count_prefix("prompt:").await.unwrap(), 1);
    }
}
