//! Aggregate rating record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::artifact::ArtifactType;
use crate::domain::metric::{MetricName, MetricResult, MetricValue, SizeScore};

/// All metric scores for one model at one point in time
///
/// Latencies are wall-clock seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub name: String,
    pub category: ArtifactType,
    pub net_score: f64,
    pub net_score_latency: f64,
    pub ramp_up_time: f64,
    pub ramp_up_time_latency: f64,
    pub bus_factor: f64,
    pub bus_factor_latency: f64,
    pub performance_claims: f64,
    pub performance_claims_latency: f64,
    pub license: f64,
    pub license_latency: f64,
    pub dataset_and_code_score: f64,
    pub dataset_and_code_score_latency: f64,
    pub dataset_quality: f64,
    pub dataset_quality_latency: f64,
    pub code_quality: f64,
    pub code_quality_latency: f64,
    pub reproducibility: f64,
    pub reproducibility_latency: f64,
    pub reviewedness: f64,
    pub reviewedness_latency: f64,
    pub tree_score: f64,
    pub tree_score_latency: f64,
    pub size_score: SizeScore,
    pub size_score_latency: f64,
}

impl Rating {
    /// Assemble the record from per-metric results
    ///
    /// Metrics absent from `results` are reported as 0.0 with zero latency.
    pub fn assemble(
        name: impl Into<String>,
        results: &BTreeMap<MetricName, MetricResult>,
        net_score: f64,
        net_score_latency: f64,
    ) -> Self {
        let scalar = |metric: MetricName| {
            results
                .get(&metric)
                .map(|r| r.value.as_f64())
                .unwrap_or(0.0)
        };
        let latency = |metric: MetricName| results.get(&metric).map(|r| r.latency).unwrap_or(0.0);

        let size_score = match results.get(&MetricName::SizeScore).map(|r| r.value) {
            Some(MetricValue::Size(size)) => size,
            Some(MetricValue::Scalar(score)) => SizeScore::uniform(score),
            None => SizeScore::default(),
        };

        Self {
            name: name.into(),
            category: ArtifactType::Model,
            net_score,
            net_score_latency,
            ramp_up_time: scalar(MetricName::RampUpTime),
            ramp_up_time_latency: latency(MetricName::RampUpTime),
            bus_factor: scalar(MetricName::BusFactor),
            bus_factor_latency: latency(MetricName::BusFactor),
            performance_claims: scalar(MetricName::PerformanceClaims),
            performance_claims_latency: latency(MetricName::PerformanceClaims),
            license: scalar(MetricName::License),
            license_latency: latency(MetricName::License),
            dataset_and_code_score: scalar(MetricName::DatasetAndCodeScore),
            dataset_and_code_score_latency: latency(MetricName::DatasetAndCodeScore),
            dataset_quality: scalar(MetricName::DatasetQuality),
            dataset_quality_latency: latency(MetricName::DatasetQuality),
            code_quality: scalar(MetricName::CodeQuality),
            code_quality_latency: latency(MetricName::CodeQuality),
            reproducibility: scalar(MetricName::Reproducibility),
            reproducibility_latency: latency(MetricName::Reproducibility),
            reviewedness: scalar(MetricName::Reviewedness),
            reviewedness_latency: latency(MetricName::Reviewedness),
            tree_score: scalar(MetricName::TreeScore),
            tree_score_latency: latency(MetricName::TreeScore),
            size_score,
            size_score_latency: latency(MetricName::SizeScore),
        }
    }

    /// Score reported for one metric
    pub fn score(&self, metric: MetricName) -> MetricValue {
        let scalar = match metric {
            MetricName::RampUpTime => self.ramp_up_time,
            MetricName::BusFactor => self.bus_factor,
            MetricName::PerformanceClaims => self.performance_claims,
            MetricName::License => self.license,
            MetricName::DatasetAndCodeScore => self.dataset_and_code_score,
            MetricName::DatasetQuality => self.dataset_quality,
            MetricName::CodeQuality => self.code_quality,
            MetricName::Reproducibility => self.reproducibility,
            MetricName::Reviewedness => self.reviewedness,
            MetricName::TreeScore => self.tree_score,
            MetricName::SizeScore => return MetricValue::Size(self.size_score),
        };

        MetricValue::Scalar(scalar)
    }
}
