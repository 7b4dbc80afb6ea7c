use async_trait::async_trait;

use super::is_truthy;
use super::license::card_license;
use crate::domain::{DomainError, Metric, MetricName, MetricValue, ModelArtifact};

/// Documentation and adoption of the model's training dataset
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetQualityMetric;

impl DatasetQualityMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for DatasetQualityMetric {
    fn name(&self) -> MetricName {
        MetricName::DatasetQuality
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let dataset = model.dataset_metadata().await;
        if dataset.is_empty() {
            return Ok(MetricValue::Scalar(0.0));
        }

        let mut score = 0.0;

        let described = dataset.get_str("description").is_some_and(|d| !d.trim().is_empty())
            || dataset.get("cardData").is_some_and(is_truthy);
        if described {
            score += 0.4;
        }
        if card_license(dataset).is_some() {
            score += 0.2;
        }
        if dataset.get_f64("downloads").unwrap_or(0.0) > 1_000.0 {
            score += 0.2;
        }
        if dataset.get_f64("likes").unwrap_or(0.0) > 10.0 {
            score += 0.2;
        }

        Ok(MetricValue::Scalar(f64::min(score, 1.0)))
    }
}
