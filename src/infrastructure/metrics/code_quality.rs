use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, Metadata, Metric, MetricName, MetricValue, ModelArtifact};

const POPULAR_STARS: u64 = 50;

/// Engineering hygiene of the code repository: tests, CI, a README and
/// either community adoption or a declared license, 0.25 each
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeQualityMetric;

impl CodeQualityMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for CodeQualityMetric {
    fn name(&self) -> MetricName {
        MetricName::CodeQuality
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let gh = model.github_metadata().await;
        if gh.is_empty() {
            return Ok(MetricValue::Scalar(0.0));
        }

        let paths = tree_paths(gh);
        let checks = [
            paths.iter().any(|p| is_test_path(p)),
            paths.iter().any(|p| p.starts_with(".github/workflows/")),
            paths
                .iter()
                .any(|p| !p.contains('/') && p.starts_with("readme")),
            gh.get_u64("stargazers_count").unwrap_or(0) >= POPULAR_STARS
                || gh.get("license").is_some_and(Value::is_object),
        ];

        let passed = checks.iter().filter(|c| **c).count();
        Ok(MetricValue::Scalar(passed as f64 * 0.25))
    }
}

/// Lowercased paths of all tree entries
fn tree_paths(gh: &Metadata) -> Vec<String> {
    gh.get_array("tree")
        .iter()
        .filter_map(|entry| entry.get("path").and_then(Value::as_str))
        .map(str::to_lowercase)
        .collect()
}

fn is_test_path(path: &str) -> bool {
    let mut segments = path.split('/');
    let file_name = segments.next_back().unwrap_or_default();

    segments.any(|dir| dir == "test" || dir == "tests")
        || file_name.starts_with("test_")
        || file_name
            .rsplit_once('.')
            .is_some_and(|(stem, _)| stem.ends_with("_test") || stem.ends_with(".test") || stem.ends_with(".spec"))
}
