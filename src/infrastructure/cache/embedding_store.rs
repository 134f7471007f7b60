//! Embedding index and prompt text kept in the shared key/value backend

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::cache::{embedding_key, prompt_key, KvBackend, EMBEDDING_KEY_PREFIX};
use crate::domain::embedding::encode;
use crate::domain::semantic::EmbeddingStore;
use crate::domain::DomainError;

/// [`EmbeddingStore`] over the `emb:` and `prompt:` namespaces of a [`KvBackend`]
#[derive(Debug, Clone)]
pub struct KvEmbeddingStore {
    backend: Arc<dyn KvBackend>,
}

impl KvEmbeddingStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Remember the original prompt text for gray-zone verification
    pub async fn save_prompt(&self, hash: &str, text: &str) -> Result<(), DomainError> {
        self.backend.set(&prompt_key(hash), text.as_bytes()).await
    }

    pub async fn save_embedding(&self, hash: &str, vector: &[f32]) -> Result<(), DomainError> {
        self.backend.set(&embedding_key(hash), &encode(vector)).await
    }
}

#[async_trait]
impl EmbeddingStore for KvEmbeddingStore {
    async fn get_all_embeddings(&self) -> Result<BTreeMap<String, Vec<u8>>, DomainError> {
        self.backend.scan_prefix(EMBEDDING_KEY_PREFIX).await
    }

    async fn get_prompt_by_hash(&self, hash: &str) -> Result<String, DomainError> {
        let bytes = self
            .backend
            .get(&prompt_key(hash))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No prompt stored for hash {}", hash)))?;

        String::from_utf8(bytes).map_err(|e| {
            DomainError::data_corruption(format!("Prompt for hash {} is not UTF-8: {}", hash, e))
        })
    }

    async fn count_embeddings(&self) -> Result<usize, DomainError> {
        self.backend.count_prefix(EMBEDDING_KEY_PREFIX).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{derive_key, MockKvBackend};
    use crate::domain::embedding::decode;
    use crate::infrastructure::cache::InMemoryBackend;

    #[tokio::test]
    async fn test_save_and_read_back() {
        let store = KvEmbeddingStore::new(Arc::new(InMemoryBackend::new()));
        let hash = derive_key("what is rust");

        store.save_prompt(&hash, "what is rust").await.unwrap();
        store.save_embedding(&hash, &[0.25, -1.0]).await.unwrap();

        let all = store.get_all_embeddings().await.unwrap();
        let stored = all.get(&format!("emb:{}", hash)).unwrap();
        assert_eq!(decode(stored), vec![0.25, -1.0]);

        assert_eq!(store.get_prompt_by_hash(&hash).await.unwrap(), "what is rust");
        assert_eq!(store.count_embeddings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_index_excludes_other_namespaces() {
        let backend = Arc::new(
            MockKvBackend::new()
                .with_entry("emb:a", encode(&[1.0]))
                .with_entry("prompt:a", "text")
                .with_entry("a", "{}"),
        );
        let store = KvEmbeddingStore::new(backend);

        let all = store.get_all_embeddings().await.unwrap();

        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["emb:a"]);
        assert_eq!(store.count_embeddings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_not_found() {
        let store = KvEmbeddingStore::new(Arc::new(InMemoryBackend::new()));

        let result = store.get_prompt_by_hash("absent").await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_utf8_prompt_is_corruption() {
        let backend = Arc::new(MockKvBackend::new().with_entry("prompt:bad", vec![0xff, 0xfe]));
        let store = KvEmbeddingStore::new(backend);

        let result = store.get_prompt_by_hash("bad").await;

        assert!(matches!(result, Err(DomainError::DataCorruption { .. })));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = Arc::new(MockKvBackend::new().with_error("connection refused"));
        let store = KvEmbeddingStore::new(backend);

        assert!(matches!(
            store.get_all_embeddings().await,
            Err(DomainError::Storage { .. })
        ));
        assert!(matches!(
            store.get_prompt_by_hash("a").await,
            Err(DomainError::Storage { .. })
        ));
    }
}
