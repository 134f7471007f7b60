//! Embedding vectors and the provider abstraction

mod provider;
mod provider_kind;
pub mod vector;

pub use provider::{ProviderRegistry, SemanticProvider};
pub use provider_kind::ProviderKind;
pub use vector::{cosine_similarity, decode, encode};

#[cfg(test)]
pub use provider::MockSemanticProvider;
