//! Content-derived cache keys and the key namespaces sharing one backend

use sha2::{Digest, Sha256};

/// Prefix of keys holding encoded embedding vectors
pub const EMBEDDING_KEY_PREFIX: &str = "emb:";

/// Prefix of keys holding the original prompt text
pub const PROMPT_KEY_PREFIX: &str = "prompt:";

/// Derive the cache key for a prompt: lowercase hex SHA-256 of its text
pub fn derive_key(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}

/// Key under which the embedding for `hash` is stored
pub fn embedding_key(hash: &str) -> String {
    format!("{}{}", EMBEDDING_KEY_PREFIX, hash)
}

/// Key under which the original prompt for `hash` is stored
pub fn prompt_key(hash: &str) -> String {
    format!("{}{}", PROMPT_KEY_PREFIX, hash)
}

/// Strip the embedding namespace, yielding the response cache key
pub fn strip_embedding_prefix(key: &str) -> &str {
    key.strip_prefix(EMBEDDING_KEY_PREFIX).unwrap_or(key)
}
