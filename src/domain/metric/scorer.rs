//! Metric trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{MetricName, MetricValue};
use crate::domain::model::ModelArtifact;
use crate::domain::DomainError;

/// A scoring function over one model's metadata
///
/// Evaluation must depend only on the model's current metadata snapshot
/// (plus, for lineage, previously persisted scores of other artifacts).
#[async_trait]
pub trait Metric: Send + Sync + Debug {
    /// Rating field this metric fills
    fn name(&self) -> MetricName;

    /// Score the model
    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError>;

    /// Value substituted when evaluation fails
    fn fallback(&self) -> MetricValue {
        MetricValue::Scalar(0.0)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock metric returning a fixed value, an error, or panicking
    #[derive(Debug)]
    pub struct MockMetric {
        name: MetricName,
        value: Option<MetricValue>,
        error: Option<String>,
        panic: bool,
        calls: AtomicUsize,
    }

    impl MockMetric {
        pub fn new(name: MetricName, value: impl Into<MetricValue>) -> Self {
            Self {
                name,
                value: Some(value.into()),
                error: None,
                panic: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(name: MetricName, error: impl Into<String>) -> Self {
            Self {
                name,
                value: None,
                error: Some(error.into()),
                panic: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn panicking(name: MetricName) -> Self {
            Self {
                name,
                value: None,
                error: None,
                panic: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Metric for MockMetric {
        fn name(&self) -> MetricName {
            self.name
        }

        async fn evaluate(&self, _model: &ModelArtifact) -> Result<MetricValue, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.panic {
                panic!("metric {} blew up", self.name);
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::metric(self.name.as_str(), error));
            }

            self.value
                .ok_or_else(|| DomainError::metric(self.name.as_str(), "No mock value configured"))
        }

        fn fallback(&self) -> MetricValue {
            match self.name {
                MetricName::Reviewedness => MetricValue::Scalar(-1.0),
                _ => MetricValue::Scalar(0.0),
            }
        }
    }
}
