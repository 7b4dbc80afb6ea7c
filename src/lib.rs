//! Trustworthy Model Registry
//!
//! Registers models, datasets and code from their source URLs and rates
//! models with a pipeline of scoring metrics:
//! - Metadata harvested from HuggingFace, GitHub and dataset hosts (cached)
//! - Eleven metrics combined into a weighted net score
//! - Ratings persisted onto the artifact record, with one-level lineage

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::{ArtifactStore, LlmProvider, MetadataFetchers};
use infrastructure::{
    fetchers::{CachedFetcher, DatasetFetcher, GitHubFetcher, HuggingFaceFetcher},
    http_client::HttpClient,
    llm::OpenAiProvider,
    logging,
    metrics::{standard_metrics, ProcessRepoRunner, RampUpMetric, ReproducibilityMetric},
    services::{ArtifactService, RatingService},
    storage::InMemoryArtifactStore,
};
use tracing::{info, warn};

/// Wired registry services sharing one artifact store
#[derive(Debug)]
pub struct Registry {
    pub artifacts: ArtifactService,
    pub ratings: RatingService,
    pub store: Arc<dyn ArtifactStore>,
}

/// Load `.env`, the layered configuration, and install logging
pub fn init_from_env() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// Create the registry over a fresh in-memory store
pub fn create_registry(config: &AppConfig) -> anyhow::Result<Registry> {
    create_registry_with_store(config, Arc::new(InMemoryArtifactStore::new()))
}

/// Create the registry over the given artifact store
pub fn create_registry_with_store(
    config: &AppConfig,
    store: Arc<dyn ArtifactStore>,
) -> anyhow::Result<Registry> {
    config.scoring.weights.validate()?;

    let client =
        HttpClient::with_timeout(Duration::from_secs(config.fetchers.request_timeout_secs))?;

    let fetchers = create_fetchers(config, &client);
    let ramp_up = create_ramp_up_metric(config, &client);

    let runner = ProcessRepoRunner::new()
        .with_git_bin(config.reproducibility.git_bin.clone())
        .with_python_bin(config.reproducibility.python_bin.clone())
        .with_timeout(Duration::from_secs(config.reproducibility.timeout_secs));
    let reproducibility = ReproducibilityMetric::new(Arc::new(runner))
        .with_max_candidates(config.reproducibility.max_candidates);

    let metrics = standard_metrics(store.clone(), ramp_up, reproducibility);
    info!(metrics = metrics.len(), "Metrics registered");

    let artifacts = ArtifactService::new(store.clone()).with_fetchers(fetchers.clone());
    let ratings = RatingService::new(store.clone(), fetchers, metrics)
        .with_weights(config.scoring.weights.clone())?;

    Ok(Registry {
        artifacts,
        ratings,
        store,
    })
}

fn create_fetchers(config: &AppConfig, client: &HttpClient) -> MetadataFetchers {
    let ttl = Duration::from_secs(config.fetchers.cache_ttl_secs);
    let capacity = config.fetchers.cache_capacity;

    let huggingface =
        HuggingFaceFetcher::with_base_url(client.clone(), &config.fetchers.huggingface_base_url);
    let github = GitHubFetcher::with_base_url(client.clone(), &config.fetchers.github_api_url)
        .with_token(config.fetchers.github_token.clone());
    let dataset =
        DatasetFetcher::with_base_url(client.clone(), &config.fetchers.huggingface_base_url);

    info!(
        ttl_secs = config.fetchers.cache_ttl_secs,
        capacity,
        github_token = config.fetchers.github_token.is_some(),
        "Metadata fetchers configured"
    );

    MetadataFetchers::new(
        Arc::new(CachedFetcher::with_capacity(huggingface, ttl, capacity)),
        Arc::new(CachedFetcher::with_capacity(github, ttl, capacity)),
        Arc::new(CachedFetcher::with_capacity(dataset, ttl, capacity)),
    )
}

fn create_ramp_up_metric(config: &AppConfig, client: &HttpClient) -> RampUpMetric {
    if !config.llm.enabled {
        return RampUpMetric::heuristic();
    }

    let Some(api_key) = config.llm.api_key.as_deref().filter(|k| !k.is_empty()) else {
        warn!("LLM scoring enabled but no API key configured, using heuristic ramp-up");
        return RampUpMetric::heuristic();
    };

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::with_base_url(
        client.clone(),
        api_key,
        &config.llm.base_url,
    ));
    info!(model = %config.llm.model, "LLM ramp-up scoring enabled");

    RampUpMetric::with_llm(provider, config.llm.model.clone())
        .with_generation(config.llm.temperature, config.llm.max_tokens)
}
