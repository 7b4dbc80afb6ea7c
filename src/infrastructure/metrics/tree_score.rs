use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::lineage::{extract_parents, is_parent_match};
use crate::domain::metric::round_to;
use crate::domain::{
    ArtifactStore, ArtifactType, DomainError, Metadata, Metric, MetricName, MetricValue,
    ModelArtifact,
};

/// Well-known architecture families used when no parent is declared
const BASE_FAMILIES: [&str; 12] = [
    "bert",
    "gpt",
    "t5",
    "roberta",
    "distilbert",
    "albert",
    "electra",
    "bart",
    "pegasus",
    "llama",
    "mistral",
    "falcon",
];

/// Average net score of the model's declared parents, read from previously
/// rated artifacts in the store
///
/// The lookup is one level deep and depends on which parents have already
/// been rated.
#[derive(Debug, Clone)]
pub struct TreeScoreMetric {
    store: Arc<dyn ArtifactStore>,
}

impl TreeScoreMetric {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    async fn parent_scores(
        &self,
        model: &ModelArtifact,
        parents: &[String],
    ) -> Result<Vec<f64>, DomainError> {
        let candidates = self.store.list_by_type(ArtifactType::Model).await?;

        Ok(candidates
            .iter()
            .filter(|candidate| candidate.id() != model.id())
            .filter(|candidate| is_parent_match(candidate.name(), parents))
            .filter_map(|candidate| {
                let score = candidate.net_score().filter(|s| *s > 0.0);
                debug!(parent = candidate.name(), ?score, "Matched parent artifact");
                score
            })
            .collect())
    }
}

#[async_trait]
impl Metric for TreeScoreMetric {
    fn name(&self) -> MetricName {
        MetricName::TreeScore
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let hf = model.hf_metadata().await;
        let parents = extract_parents(hf);

        if parents.is_empty() {
            return Ok(MetricValue::Scalar(family_heuristic(hf, model.name())));
        }

        let scores = self.parent_scores(model, &parents).await?;
        if scores.is_empty() {
            info!(model = model.name(), ?parents, "No rated parent artifacts found");
            return Ok(MetricValue::Scalar(0.0));
        }

        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        info!(model = model.name(), parents = scores.len(), average, "Tree score evaluated");

        Ok(MetricValue::Scalar(round_to(average, 2)))
    }
}

/// Lineage estimate from the model id when no parent is declared
pub fn family_heuristic(hf: &Metadata, fallback_name: &str) -> f64 {
    let model_id = hf
        .get_str("modelId")
        .unwrap_or(fallback_name)
        .to_lowercase();

    if !BASE_FAMILIES.iter().any(|family| model_id.contains(family)) {
        return 0.0;
    }

    if ["distil", "mini", "small"].iter().any(|k| model_id.contains(k)) {
        return 0.85;
    }

    let fine_tuned = hf.tags().any(|tag| {
        let tag = tag.to_lowercase();
        ["squad", "glue", "mnli"].iter().any(|d| tag.contains(d))
    });

    if fine_tuned { 0.75 } else { 0.5 }
}
