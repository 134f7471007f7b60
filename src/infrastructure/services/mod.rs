//! Infrastructure services

mod prompt_cache_service;

pub use prompt_cache_service::{CacheHit, PromptCacheService, DEFAULT_RESPONSE_TTL_SECS};
