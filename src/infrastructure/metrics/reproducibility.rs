use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::runner::{find_demo_candidates, ExecutionOutcome, RepoRunner, DEMO_FILE_PATTERNS};
use crate::domain::{DomainError, Metadata, Metric, MetricName, MetricValue, ModelArtifact};

pub const DEFAULT_MAX_CANDIDATES: usize = 5;

const NO_DEMO: f64 = 0.0;
const DEMO_UNVERIFIED: f64 = 0.5;
const DEMO_RUNS: f64 = 1.0;

/// Whether a demo in the model's code repository runs out of the box
///
/// 1.0 when a demo script exits successfully, 0.5 when a demo exists but
/// could not be run successfully, 0.0 when there is no demo.
#[derive(Debug, Clone)]
pub struct ReproducibilityMetric {
    runner: Arc<dyn RepoRunner>,
    max_candidates: usize,
}

impl ReproducibilityMetric {
    pub fn new(runner: Arc<dyn RepoRunner>) -> Self {
        Self {
            runner,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Clone the repository and try its demos; any failure here counts as unverified
    async fn try_demos(&self, clone_url: &str) -> Result<bool, DomainError> {
        let workdir = tempfile::tempdir()
            .map_err(|e| DomainError::execution(format!("Failed to create temp dir: {}", e)))?;

        self.runner.clone_shallow(clone_url, workdir.path()).await?;

        let root = workdir.path().to_path_buf();
        let limit = self.max_candidates;
        let candidates = tokio::task::spawn_blocking(move || find_demo_candidates(&root, limit))
            .await
            .map_err(|e| DomainError::internal(format!("Demo discovery failed: {}", e)))?;

        if candidates.is_empty() {
            debug!(clone_url, "No demo files in cloned repository");
        }

        for script in &candidates {
            match self.runner.run_script(script, workdir.path()).await {
                Ok(ExecutionOutcome::Succeeded) => return Ok(true),
                Ok(outcome) => debug!(script = %script.display(), ?outcome, "Demo did not succeed"),
                Err(e) => debug!(script = %script.display(), error = %e, "Demo could not run"),
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl Metric for ReproducibilityMetric {
    fn name(&self) -> MetricName {
        MetricName::Reproducibility
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let gh = model.github_metadata().await;

        if gh.is_empty() || !has_demo_files(gh) {
            debug!(model = model.name(), "No demo files found");
            return Ok(MetricValue::Scalar(NO_DEMO));
        }

        let Some(clone_url) = gh.get_str("clone_url") else {
            info!(model = model.name(), "Demo exists but no clone URL");
            return Ok(MetricValue::Scalar(DEMO_UNVERIFIED));
        };

        let score = match self.try_demos(clone_url).await {
            Ok(true) => DEMO_RUNS,
            Ok(false) => DEMO_UNVERIFIED,
            Err(e) => {
                warn!(model = model.name(), clone_url, error = %e, "Demo could not be tested");
                DEMO_UNVERIFIED
            }
        };

        info!(model = model.name(), score, "Reproducibility evaluated");
        Ok(MetricValue::Scalar(score))
    }
}

/// Whether the repository tree lists a demo file at one of the known paths
pub fn has_demo_files(gh: &Metadata) -> bool {
    gh.get_array("tree")
        .iter()
        .filter_map(|entry| entry.get("path").and_then(|p| p.as_str()))
        .map(str::to_lowercase)
        .any(|path| DEMO_FILE_PATTERNS.contains(&path.as_str()))
}
