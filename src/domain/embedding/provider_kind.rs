//! Closed set of named embedding/verification backends

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Supported provider backends
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Mistral,
    Claude,
}

impl ProviderKind {
    /// All known backends, in display order
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Mistral,
        ProviderKind::Claude,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Claude => "claude",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "mistral" => Ok(ProviderKind::Mistral),
            "claude" => Ok(ProviderKind::Claude),
            _ => Err(DomainError::invalid_provider(s)),
        }
    }
}
