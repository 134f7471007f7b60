//! Domain layer - Core business logic and entities

pub mod cache;
pub mod embedding;
pub mod error;
pub mod semantic;

pub use cache::{CacheEntry, KvBackend};
pub use embedding::{ProviderKind, ProviderRegistry, SemanticProvider};
pub use error::DomainError;
pub use semantic::{
    EmbeddingStore, MatchDecision, SemanticEngine, SimilarityMatch, ThresholdConfig,
};
