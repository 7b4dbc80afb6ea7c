//! Net score weighting

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::metric::{MetricName, MetricResult};
use crate::domain::DomainError;

/// Per-metric weights used to combine scores into the net score
///
/// Metrics with zero weight, and sentinel (negative) results, take no part
/// in the combination; the remaining weights are renormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetScoreWeights(BTreeMap<MetricName, f64>);

impl Default for NetScoreWeights {
    fn default() -> Self {
        Self::from_pairs([
            (MetricName::RampUpTime, 0.15),
            (MetricName::BusFactor, 0.10),
            (MetricName::PerformanceClaims, 0.10),
            (MetricName::License, 0.15),
            (MetricName::DatasetAndCodeScore, 0.10),
            (MetricName::DatasetQuality, 0.10),
            (MetricName::CodeQuality, 0.10),
            (MetricName::Reproducibility, 0.05),
            (MetricName::Reviewedness, 0.05),
            (MetricName::TreeScore, 0.05),
            (MetricName::SizeScore, 0.05),
        ])
    }
}

impl NetScoreWeights {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (MetricName, f64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Equal weight for every metric
    pub fn uniform() -> Self {
        Self::from_pairs(MetricName::ALL.into_iter().map(|name| (name, 1.0)))
    }

    pub fn weight(&self, name: MetricName) -> f64 {
        self.0.get(&name).copied().unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some((name, weight)) = self.0.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(DomainError::configuration(format!(
                "Invalid weight {} for metric '{}': must be a non-negative number",
                weight, name
            )));
        }

        if self.0.values().all(|w| *w == 0.0) {
            return Err(DomainError::configuration(
                "At least one metric weight must be positive",
            ));
        }

        Ok(())
    }

    /// Weighted mean of the applicable results, clamped to [0, 1]
    pub fn combine(&self, results: &BTreeMap<MetricName, MetricResult>) -> f64 {
        let (weighted_sum, total_weight) = results
            .iter()
            .filter(|(_, result)| !result.value.is_sentinel())
            .map(|(name, result)| (self.weight(*name), result.value.as_f64().clamp(0.0, 1.0)))
            .filter(|(weight, _)| *weight > 0.0)
            .fold((0.0, 0.0), |(sum, total), (weight, score)| {
                (sum + weight * score, total + weight)
            });

        if total_weight == 0.0 {
            return 0.0;
        }

        (weighted_sum / total_weight).clamp(0.0, 1.0)
    }
}
