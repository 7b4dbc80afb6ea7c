//! Metric names, values and results

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every field of the rating record produced by a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    RampUpTime,
    BusFactor,
    PerformanceClaims,
    License,
    DatasetAndCodeScore,
    DatasetQuality,
    CodeQuality,
    Reproducibility,
    Reviewedness,
    TreeScore,
    SizeScore,
}

impl MetricName {
    pub const ALL: [MetricName; 11] = [
        Self::RampUpTime,
        Self::BusFactor,
        Self::PerformanceClaims,
        Self::License,
        Self::DatasetAndCodeScore,
        Self::DatasetQuality,
        Self::CodeQuality,
        Self::Reproducibility,
        Self::Reviewedness,
        Self::TreeScore,
        Self::SizeScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RampUpTime => "ramp_up_time",
            Self::BusFactor => "bus_factor",
            Self::PerformanceClaims => "performance_claims",
            Self::License => "license",
            Self::DatasetAndCodeScore => "dataset_and_code_score",
            Self::DatasetQuality => "dataset_quality",
            Self::CodeQuality => "code_quality",
            Self::Reproducibility => "reproducibility",
            Self::Reviewedness => "reviewedness",
            Self::TreeScore => "tree_score",
            Self::SizeScore => "size_score",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployability per target hardware class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeScore {
    pub raspberry_pi: f64,
    pub jetson_nano: f64,
    pub desktop_pc: f64,
    pub aws_server: f64,
}

impl SizeScore {
    pub fn uniform(score: f64) -> Self {
        Self {
            raspberry_pi: score,
            jetson_nano: score,
            desktop_pc: score,
            aws_server: score,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.raspberry_pi + self.jetson_nano + self.desktop_pc + self.aws_server) / 4.0
    }
}

/// Score produced by one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Size(SizeScore),
}

impl MetricValue {
    /// Single-number view; size scores collapse to their mean
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Scalar(score) => *score,
            Self::Size(size) => size.mean(),
        }
    }

    /// Out-of-band "not applicable" marker (negative score)
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Scalar(score) if *score < 0.0)
    }
}

impl From<f64> for MetricValue {
    fn from(score: f64) -> Self {
        Self::Scalar(score)
    }
}

/// A metric value with the wall-clock time it took, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub value: MetricValue,
    pub latency: f64,
}

impl MetricResult {
    pub fn new(value: MetricValue, latency: f64) -> Self {
        Self { value, latency }
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_name_serde() {
        let json = serde_json::to_string(&MetricName::DatasetAndCodeScore).unwrap();
        assert_eq!(json, "\"dataset_and_code_score\"");

        for name in MetricName::ALL {
            let parsed: MetricName =
                serde_json::from_str(&format!("\"{}\"", name.as_str())).unwrap();
            assert_eq!(parsed, name);
        }
    }

    #[test]
    fn test_size_score_mean() {
        let size = SizeScore {
            raspberry_pi: 0.0,
            jetson_nano: 0.5,
            desktop_pc: 1.0,
            aws_server: 1.0,
        };
        assert_eq!(size.mean(), 0.625);
        assert_eq!(MetricValue::Size(size).as_f64(), 0.625);
    }

    #[test]
    fn test_sentinel() {
        assert!(MetricValue::Scalar(-1.0).is_sentinel());
        assert!(!MetricValue::Scalar(0.0).is_sentinel());
        assert!(!MetricValue::Size(SizeScore::uniform(0.0)).is_sentinel());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to((0.333333 + 0.666666) / 2.0, 2), 0.5);
        assert_eq!(round_to((0.8 + 0.6) / 2.0, 2), 0.7);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }
}
