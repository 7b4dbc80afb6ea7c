use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainError, Metric, MetricName, MetricValue, ModelArtifact};

/// Reported when there is no pull request data to judge
pub const NO_REVIEW_DATA: f64 = -1.0;

/// Fraction of merged pull requests that show signs of review
///
/// Only the most recent closed pull requests fetched with the repository
/// are considered.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewednessMetric;

impl ReviewednessMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for ReviewednessMetric {
    fn name(&self) -> MetricName {
        MetricName::Reviewedness
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let pull_requests = model.github_metadata().await.get_array("pull_requests");

        if pull_requests.is_empty() {
            debug!(model = model.name(), "No pull request data");
            return Ok(MetricValue::Scalar(NO_REVIEW_DATA));
        }

        let merged: Vec<&Value> = pull_requests
            .iter()
            .filter(|pr| pr.get("merged_at").is_some_and(|m| !m.is_null()))
            .collect();

        if merged.is_empty() {
            return Ok(MetricValue::Scalar(0.0));
        }

        let reviewed = merged.iter().filter(|pr| was_reviewed(pr)).count();
        debug!(model = model.name(), reviewed, merged = merged.len(), "Reviewed pull requests");

        Ok(MetricValue::Scalar(reviewed as f64 / merged.len() as f64))
    }

    fn fallback(&self) -> MetricValue {
        MetricValue::Scalar(NO_REVIEW_DATA)
    }
}

fn was_reviewed(pr: &Value) -> bool {
    let positive = |key: &str| pr.get(key).and_then(Value::as_f64).is_some_and(|n| n > 0.0);
    let non_empty = |key: &str| {
        pr.get(key)
            .and_then(Value::as_array)
            .is_some_and(|list| !list.is_empty())
    };

    positive("comments")
        || positive("review_comments")
        || non_empty("requested_reviewers")
        || non_empty("requested_teams")
}
