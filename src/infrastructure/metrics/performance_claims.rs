use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, Metadata, Metric, MetricName, MetricValue, ModelArtifact};

const EVALUATION_TERMS: [&str; 7] = [
    "accuracy",
    "f1",
    "bleu",
    "rouge",
    "benchmark",
    "evaluation",
    "perplexity",
];

const BENCHMARK_DATASETS: [&str; 8] = [
    "squad", "glue", "mnli", "superglue", "imagenet", "mmlu", "wikitext", "coco",
];

/// Evidence backing the model's performance claims
///
/// 1.0 for structured evaluation results in the card's model index, 0.5
/// for evaluation vocabulary in the README or benchmark dataset tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerformanceClaimsMetric;

impl PerformanceClaimsMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for PerformanceClaimsMetric {
    fn name(&self) -> MetricName {
        MetricName::PerformanceClaims
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let hf = model.hf_metadata().await;

        let score = if has_reported_results(hf) {
            1.0
        } else if mentions_evaluation(hf) {
            0.5
        } else {
            0.0
        };

        Ok(MetricValue::Scalar(score))
    }
}

/// Whether any model-index entry carries results with metrics
fn has_reported_results(hf: &Metadata) -> bool {
    let index = hf
        .get_object("cardData")
        .and_then(|card| card.get("model-index"))
        .or_else(|| hf.get("model-index"));

    let Some(Value::Array(entries)) = index else {
        return false;
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("results").and_then(Value::as_array))
        .flatten()
        .any(|result| {
            result
                .get("metrics")
                .and_then(Value::as_array)
                .is_some_and(|metrics| !metrics.is_empty())
        })
}

fn mentions_evaluation(hf: &Metadata) -> bool {
    let readme_mentions = hf.get_str("readme").is_some_and(|readme| {
        let readme = readme.to_lowercase();
        EVALUATION_TERMS.iter().any(|term| readme.contains(term))
    });

    readme_mentions
        || hf.tags().any(|tag| {
            let tag = tag.to_lowercase();
            BENCHMARK_DATASETS.iter().any(|d| tag.contains(d))
        })
}
