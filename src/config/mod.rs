//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, FetcherConfig, LlmConfig, LogFormat, LoggingConfig, ReproducibilityConfig,
    ScoringConfig,
};
