//! Cache infrastructure - key/value backends and the stores built on them

mod embedding_store;
mod factory;
mod in_memory;
mod redis;
mod response_cache;

pub use embedding_store::KvEmbeddingStore;
pub use factory::{BackendConfig, BackendFactory, BackendType};
pub use in_memory::InMemoryBackend;
pub use redis::{RedisBackend, RedisBackendConfig};
pub use response_cache::ResponseCache;
