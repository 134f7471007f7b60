use serde::{Deserialize, Deserializer};

use crate::domain::semantic::ThresholdConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub semantic: SemanticConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub upstream: UpstreamConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Threshold policy and provider selection
///
/// Threshold inputs that are missing or unreadable deserialize to `None`
/// and are resolved by [`SemanticConfig::thresholds`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    #[serde(deserialize_with = "lenient_f32")]
    pub high_threshold: Option<f32>,
    #[serde(deserialize_with = "lenient_f32")]
    pub low_threshold: Option<f32>,
    #[serde(deserialize_with = "lenient_bool")]
    pub gray_zone_verification: Option<bool>,
    /// Provider active at startup
    pub provider: String,
    /// Deadline for one lookup, 0 disables it
    pub call_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of stored responses, 0 keeps them forever
    pub ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `in_memory` or `redis`
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub mistral: ProviderConfig,
    pub claude: ClaudeProviderConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub embedding_model: Option<String>,
    pub judge_model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub embedding_model: Option<String>,
    pub judge_model: Option<String>,
    /// Embeddings are served by Voyage AI
    pub voyage_api_key: String,
    pub voyage_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Empty passes the caller's Authorization header through
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            high_threshold: None,
            low_threshold: None,
            gray_zone_verification: None,
            provider: "openai".to_string(),
            call_timeout_secs: 30,
        }
    }
}

impl SemanticConfig {
    /// Resolve the threshold inputs, falling back to defaults where invalid
    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig::from_parts(
            self.high_threshold,
            self.low_threshold,
            self.gray_zone_verification,
        )
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 86_400 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_env_fallbacks(|name| std::env::var(name).ok());

        Ok(app_config)
    }

    /// Fill empty credentials from the providers' conventional variables
    pub fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fill = |target: &mut String, name: &str| {
            if target.is_empty() {
                if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                    *target = value;
                }
            }
        };

        fill(&mut self.providers.openai.api_key, "OPENAI_API_KEY");
        fill(&mut self.providers.mistral.api_key, "MISTRAL_API_KEY");
        fill(&mut self.providers.claude.api_key, "ANTHROPIC_API_KEY");
        fill(&mut self.providers.claude.voyage_api_key, "VOYAGE_API_KEY");
        fill(&mut self.upstream.api_key, "OPENAI_API_KEY");
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let value = Option::<Lenient>::deserialize(deserializer).unwrap_or(None);

    Ok(match value {
        Some(Lenient::Float(v)) => Some(v as f32),
        Some(Lenient::Int(v)) => Some(v as f32),
        Some(Lenient::Text(s)) => s.trim().parse().ok(),
        Some(Lenient::Bool(_)) | None => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Lenient>::deserialize(deserializer).unwrap_or(None);

    Ok(match value {
        Some(Lenient::Bool(v)) => Some(v),
        Some(Lenient::Int(v)) => Some(v != 0),
        Some(Lenient::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        Some(Lenient::Float(_)) | None => None,
    })
}
