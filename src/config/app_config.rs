use serde::Deserialize;

use crate::domain::NetScoreWeights;

/// Application configuration
///
/// Every section has defaults, so an empty configuration is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub fetchers: FetcherConfig,
    pub llm: LlmConfig,
    pub reproducibility: ReproducibilityConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Metadata source endpoints and caching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub huggingface_base_url: String,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
}

/// Text-scoring LLM collaborator (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Demo script execution
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReproducibilityConfig {
    pub timeout_secs: u64,
    pub max_candidates: usize,
    pub python_bin: String,
    pub git_bin: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: NetScoreWeights,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            huggingface_base_url: "https://huggingface.co".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            github_token: None,
            request_timeout_secs: 10,
            cache_ttl_secs: 600,
            cache_capacity: 1_000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 64,
        }
    }
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_candidates: 5,
            python_bin: "python3".to_string(),
            git_bin: "git".to_string(),
        }
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

        config.try_deserialize()
    }
}
