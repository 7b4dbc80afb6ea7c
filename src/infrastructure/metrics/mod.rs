//! Metric implementations

mod availability;
mod bus_factor;
mod code_quality;
mod dataset_quality;
mod license;
mod performance_claims;
mod ramp_up;
mod reproducibility;
mod reviewedness;
pub mod runner;
mod size_score;
mod tree_score;

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ArtifactStore, Metric};

pub use availability::AvailabilityMetric;
pub use bus_factor::BusFactorMetric;
pub use code_quality::CodeQualityMetric;
pub use dataset_quality::DatasetQualityMetric;
pub use license::{
    card_license, is_lgpl_compatible, is_restricted, repository_license, LicenseMetric,
};
pub use performance_claims::PerformanceClaimsMetric;
pub use ramp_up::{extract_relevant_sections, heuristic_score, parse_score, RampUpMetric};
pub use reproducibility::{has_demo_files, ReproducibilityMetric};
pub use reviewedness::{ReviewednessMetric, NO_REVIEW_DATA};
pub use runner::{ExecutionOutcome, ProcessRepoRunner, RepoRunner};
pub use size_score::{weight_bytes, SizeScoreMetric};
pub use tree_score::TreeScoreMetric;

/// The full metric set, in rating-record order
pub fn standard_metrics(
    store: Arc<dyn ArtifactStore>,
    ramp_up: RampUpMetric,
    reproducibility: ReproducibilityMetric,
) -> Vec<Arc<dyn Metric>> {
    vec![
        Arc::new(ramp_up),
        Arc::new(BusFactorMetric::new()),
        Arc::new(PerformanceClaimsMetric::new()),
        Arc::new(LicenseMetric::new()),
        Arc::new(AvailabilityMetric::new()),
        Arc::new(DatasetQualityMetric::new()),
        Arc::new(CodeQualityMetric::new()),
        Arc::new(reproducibility),
        Arc::new(ReviewednessMetric::new()),
        Arc::new(TreeScoreMetric::new(store)),
        Arc::new(SizeScoreMetric::new()),
    ]
}

/// Loose JSON truthiness: present, non-null, non-zero, non-empty
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
pub(crate) fn test_model(links: crate::domain::ModelLinks) -> crate::domain::ModelArtifact {
    crate::domain::ModelArtifact::offline(
        crate::domain::ArtifactId::new("test-model").unwrap(),
        "test-model",
        links,
    )
}
