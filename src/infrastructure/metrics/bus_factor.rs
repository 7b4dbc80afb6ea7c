use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, Metric, MetricName, MetricValue, ModelArtifact};

/// Contributor count at which the team-size half of the score saturates
const FULL_TEAM: f64 = 10.0;

/// Knowledge concentration in the code repository
///
/// Half the score rewards the number of contributors, half rewards how
/// little of the work the top contributor did.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusFactorMetric;

impl BusFactorMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for BusFactorMetric {
    fn name(&self) -> MetricName {
        MetricName::BusFactor
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let contributions: Vec<f64> = model
            .github_metadata()
            .await
            .get_array("contributors")
            .iter()
            .map(|c| c.get("contributions").and_then(Value::as_f64).unwrap_or(0.0))
            .collect();

        if contributions.is_empty() {
            return Ok(MetricValue::Scalar(0.0));
        }

        let total: f64 = contributions.iter().sum();
        let top = contributions.iter().cloned().fold(0.0, f64::max);
        let top_share = if total > 0.0 { top / total } else { 1.0 };

        let team = (contributions.len() as f64 / FULL_TEAM).min(1.0);
        Ok(MetricValue::Scalar(0.5 * team + 0.5 * (1.0 - top_share)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metadata, ModelLinks};
    use crate::infrastructure::metrics::test_model;
    use serde_json::json;

    async fn score(contributors: serde_json::Value) -> f64 {
        let model = test_model(ModelLinks::new("https://huggingface.co/o/m"))
            .with_github_metadata(Metadata::new().with("contributors", contributors));

        BusFactorMetric::new().evaluate(&model).await.unwrap().as_f64()
    }

    #[tokio::test]
    async fn test_no_contributors() {
        assert_eq!(score(json!([])).await, 0.0);
    }

    #[tokio::test]
    async fn test_single_maintainer() {
        assert!((score(json!([{"login": "a", "contributions": 500}])).await - 0.05).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_even_team() {
        let team: Vec<_> = (0..10)
            .map(|i| json!({"login": format!("dev{}", i), "contributions": 10}))
            .collect();

        assert!((score(json!(team)).await - 0.95).abs() < 1e-9);
    }
}
