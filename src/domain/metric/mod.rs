//! Metric domain - scoring functions and their results

mod entity;
mod scorer;

pub use entity::{round_to, MetricName, MetricResult, MetricValue, SizeScore};
pub use scorer::Metric;

#[cfg(test)]
pub use scorer::mock::MockMetric;
