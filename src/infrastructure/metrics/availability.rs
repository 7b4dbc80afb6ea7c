use async_trait::async_trait;
use tracing::debug;

use crate::domain::{DomainError, Metric, MetricName, MetricValue, ModelArtifact};

/// Score given to models with no linked resources but real HuggingFace usage
pub const HF_ONLY_SCORE: f64 = 0.7;

/// Fraction of linked resources (code repository, dataset) whose metadata
/// could actually be retrieved
#[derive(Debug, Default, Clone, Copy)]
pub struct AvailabilityMetric;

impl AvailabilityMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for AvailabilityMetric {
    fn name(&self) -> MetricName {
        MetricName::DatasetAndCodeScore
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let mut applicable = 0u32;
        let mut available = 0u32;

        if model.code_link().is_some() {
            applicable += 1;
            if !model.github_metadata().await.is_empty() {
                available += 1;
            } else {
                debug!(model = model.name(), "GitHub repository metadata is missing");
            }
        }

        if model.dataset_link().is_some() {
            applicable += 1;
            if !model.dataset_metadata().await.is_empty() {
                available += 1;
            } else {
                debug!(model = model.name(), "Dataset metadata is missing");
            }
        }

        if applicable == 0 {
            let hf = model.hf_metadata().await;
            let popular = hf.get_f64("downloads").is_some_and(|d| d != 0.0)
                || hf.get_f64("likes").is_some_and(|l| l != 0.0);

            return Ok(MetricValue::Scalar(if popular { HF_ONLY_SCORE } else { 0.0 }));
        }

        debug!(model = model.name(), available, applicable, "Resource availability");
        Ok(MetricValue::Scalar(f64::from(available) / f64::from(applicable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metadata, ModelLinks};
    use crate::infrastructure::metrics::test_model;

    fn links() -> ModelLinks {
        ModelLinks::new("https://huggingface.co/org/model")
    }

    async fn score(model: ModelArtifact) -> f64 {
        AvailabilityMetric::new().evaluate(&model).await.unwrap().as_f64()
    }

    #[tokio::test]
    async fn test_both_links_available() {
        let model = test_model(
            links()
                .with_code_link("https://github.com/org/repo")
                .with_dataset_link("https://huggingface.co/datasets/org/data"),
        )
        .with_github_metadata(Metadata::new().with("full_name", "org/repo"))
        .with_dataset_metadata(Metadata::new().with("id", "org/data"));

        assert_eq!(score(model).await, 1.0);
    }

    #[tokio::test]
    async fn test_half_available() {
        let model = test_model(
            links()
                .with_code_link("https://github.com/org/repo")
                .with_dataset_link("https://huggingface.co/datasets/org/data"),
        )
        .with_github_metadata(Metadata::new().with("full_name", "org/repo"));

        assert_eq!(score(model).await, 0.5);
    }

    #[tokio::test]
    async fn test_no_links_popular_model() {
        let model = test_model(links()).with_hf_metadata(Metadata::new().with("downloads", 120));
        assert_eq!(score(model).await, HF_ONLY_SCORE);
    }

    #[tokio::test]
    async fn test_no_links_unknown_model() {
        let model = test_model(links())
            .with_hf_metadata(Metadata::new().with("downloads", 0).with("likes", 0));
        assert_eq!(score(model).await, 0.0);
    }
}
