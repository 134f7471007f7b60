//! Provider capability trait and the registry of configured backends

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::ProviderKind;
use crate::domain::DomainError;

/// A backend that can embed text and judge whether two prompts mean the same thing
///
/// The same concrete backend always fulfils both roles.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SemanticProvider: Send + Sync {
    /// Which named backend this is
    fn kind(&self) -> ProviderKind;

    /// Produce an embedding for the given text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Ask the backend whether two prompts have the same intent
    ///
    /// Anything other than an explicit affirmative answer is `false`.
    async fn check_similarity(&self, first: &str, second: &str) -> Result<bool, DomainError>;
}

/// Providers available for hot-swapping, keyed by backend name
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, Arc<dyn SemanticProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under the given backend name
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn SemanticProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn register(&mut self, kind: ProviderKind, provider: Arc<dyn SemanticProvider>) {
        self.providers.insert(kind, provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn SemanticProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Resolve a provider by name, rejecting unknown or unregistered names
    pub fn resolve(&self, name: &str) -> Result<(ProviderKind, Arc<dyn SemanticProvider>), DomainError> {
        let kind: ProviderKind = name.parse()?;

        self.get(kind)
            .map(|provider| (kind, provider))
            .ok_or_else(|| DomainError::invalid_provider(name))
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}
