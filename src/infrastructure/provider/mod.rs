//! Semantic provider implementations

mod claude;
mod compat;
mod factory;
pub mod http_client;
mod judge;
mod mistral;
mod openai;

pub use claude::ClaudeProvider;
pub use factory::ProviderFactory;
pub use http_client::{HttpClient, HttpClientTrait};
pub use judge::{parse_verdict, JUDGE_SYSTEM_PROMPT};
pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
