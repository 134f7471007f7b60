//! Semantic matching - threshold policy, engine and the store it reads

mod config;
mod engine;
mod store;

pub use config::{
    ThresholdConfig, DEFAULT_GRAY_ZONE_VERIFICATION, DEFAULT_HIGH_THRESHOLD,
    DEFAULT_LOW_THRESHOLD,
};
pub use engine::{MatchDecision, SemanticEngine, SimilarityMatch};
pub use store::EmbeddingStore;

#[cfg(test)]
pub use store::MockEmbeddingStore;
