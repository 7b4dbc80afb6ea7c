//! Rating service - evaluates every metric for a stored model and persists the result

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::lineage::extract_parents;
use crate::domain::metric::round_to;
use crate::domain::{
    ArtifactId, ArtifactStore, DomainError, MetadataFetchers, Metric, MetricName, MetricResult,
    ModelArtifact, ModelLinks, NetScoreWeights, Rating, StoredArtifact,
};

/// Decimal places kept for reported latencies
const LATENCY_DECIMALS: i32 = 3;

/// Rates stored models
#[derive(Debug)]
pub struct RatingService {
    store: Arc<dyn ArtifactStore>,
    fetchers: MetadataFetchers,
    metrics: Vec<Arc<dyn Metric>>,
    weights: NetScoreWeights,
}

impl RatingService {
    /// Create a new RatingService with the default net score weights
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        fetchers: MetadataFetchers,
        metrics: Vec<Arc<dyn Metric>>,
    ) -> Self {
        Self {
            store,
            fetchers,
            metrics,
            weights: NetScoreWeights::default(),
        }
    }

    /// Replace the net score weights, rejecting invalid ones
    pub fn with_weights(mut self, weights: NetScoreWeights) -> Result<Self, DomainError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn weights(&self) -> &NetScoreWeights {
        &self.weights
    }

    /// Rate the model stored under `id` and persist the rating onto its record
    #[instrument(skip(self))]
    pub async fn rate(&self, id: &str) -> Result<Rating, DomainError> {
        let artifact_id = ArtifactId::new(id)?;
        let mut stored = self
            .store
            .get(&artifact_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Artifact '{}' not found", id)))?;

        if !stored.is_model() {
            return Err(DomainError::validation(format!(
                "Artifact '{}' is a {}, only models can be rated",
                id,
                stored.artifact_type()
            )));
        }

        let hf_metadata = self.fetchers.huggingface.fetch(&stored.data.url).await;
        let links = links_for(&stored).resolve_from(&hf_metadata);
        let parents = extract_parents(&hf_metadata);

        debug!(
            artifact_id = %artifact_id,
            code_link = ?links.code_link,
            dataset_link = ?links.dataset_link,
            parents = parents.len(),
            "Resolved model links"
        );

        let model = ModelArtifact::new(
            artifact_id.clone(),
            stored.name(),
            links.clone(),
            self.fetchers.clone(),
        )
        .with_hf_metadata(hf_metadata);

        let started = Instant::now();
        let results = self.evaluate(&model).await;
        let net_score = round_to(self.weights.combine(&results), 2);
        let net_score_latency = round_to(started.elapsed().as_secs_f64(), LATENCY_DECIMALS);

        let rating = Rating::assemble(stored.name(), &results, net_score, net_score_latency);

        stored.scores = Some(serde_json::to_value(&rating).map_err(|e| {
            DomainError::internal(format!("Failed to serialize rating: {}", e))
        })?);
        stored.parents = parents;
        stored.rated_at = Some(Utc::now());
        if stored.data.code_url.is_none() {
            stored.data.code_url = links.code_link;
        }
        if stored.data.dataset_url.is_none() {
            stored.data.dataset_url = links.dataset_link;
        }

        self.store.put(&artifact_id, stored).await?;

        info!(
            artifact_id = %artifact_id,
            net_score = rating.net_score,
            latency = rating.net_score_latency,
            "Model rated"
        );

        Ok(rating)
    }

    /// Run every metric in order; failures and panics degrade to the metric's fallback
    pub async fn evaluate(&self, model: &ModelArtifact) -> BTreeMap<MetricName, MetricResult> {
        let mut results = BTreeMap::new();

        for metric in &self.metrics {
            let name = metric.name();
            let started = Instant::now();

            let value = match AssertUnwindSafe(metric.evaluate(model))
                .catch_unwind()
                .await
            {
                Ok(Ok(value)) => value,
                Ok(Err(e)) => {
                    warn!(metric = %name, model = %model.id(), error = %e, "Metric failed, using fallback");
                    metric.fallback()
                }
                Err(panic) => {
                    error!(
                        metric = %name,
                        model = %model.id(),
                        panic = %panic_message(panic.as_ref()),
                        "Metric panicked, using fallback"
                    );
                    metric.fallback()
                }
            };

            let latency = round_to(started.elapsed().as_secs_f64(), LATENCY_DECIMALS);
            debug!(metric = %name, score = value.as_f64(), latency, "Metric evaluated");
            results.insert(name, MetricResult::new(value, latency));
        }

        results
    }
}

/// Links recorded on the stored artifact
fn links_for(stored: &StoredArtifact) -> ModelLinks {
    let mut links = ModelLinks::new(stored.data.url.clone());
    if let Some(ref code_url) = stored.data.code_url {
        links = links.with_code_link(code_url.clone());
    }
    if let Some(ref dataset_url) = stored.data.dataset_url {
        links = links.with_dataset_link(dataset_url.clone());
    }
    links
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
