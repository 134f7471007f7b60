//! Embedding-backed store contract consumed by the semantic engine

use std::collections::BTreeMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Read side of the stored embedding index
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Full snapshot of `emb:`-prefixed keys to encoded vectors, ordered by key
    async fn get_all_embeddings(&self) -> Result<BTreeMap<String, Vec<u8>>, DomainError>;

    /// Original prompt text for an unprefixed hash; `NotFound` when absent
    async fn get_prompt_by_hash(&self, hash: &str) -> Result<String, DomainError>;

    /// Number of stored vectors
    async fn count_embeddings(&self) -> Result<usize, DomainError>;
}
