use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainError, Metadata, Metric, MetricName, MetricValue, ModelArtifact};

/// Licenses that can be combined with LGPL-2.1 code, lowercase SPDX ids
pub const LGPL_COMPATIBLE: [&str; 14] = [
    "mit",
    "apache-2.0",
    "bsd-2-clause",
    "bsd-3-clause",
    "bsd-3-clause-clear",
    "bsd",
    "isc",
    "zlib",
    "unlicense",
    "cc0-1.0",
    "lgpl-2.1",
    "lgpl-2.1-only",
    "lgpl-2.1-or-later",
    "lgpl-lr",
];

/// License declared by a HuggingFace card: `cardData.license` or a `license:` tag
pub fn card_license(meta: &Metadata) -> Option<String> {
    let from_card = meta
        .get_object("cardData")
        .and_then(|card| card.get("license"))
        .and_then(|license| match license {
            Value::String(s) => Some(s.clone()),
            Value::Array(list) => list.iter().find_map(Value::as_str).map(str::to_string),
            _ => None,
        });

    from_card
        .or_else(|| {
            meta.tags()
                .find_map(|tag| tag.strip_prefix("license:"))
                .map(str::to_string)
        })
        .map(|license| license.trim().to_lowercase())
        .filter(|license| !license.is_empty())
}

/// SPDX id of a GitHub repository's detected license
pub fn repository_license(gh: &Metadata) -> Option<String> {
    gh.get_object("license")
        .and_then(|license| license.get("spdx_id"))
        .and_then(Value::as_str)
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty() && id != "noassertion")
}

pub fn is_lgpl_compatible(license: &str) -> bool {
    LGPL_COMPATIBLE.contains(&license.to_lowercase().as_str())
}

/// Non-commercial Creative Commons variants and proprietary terms
pub fn is_restricted(license: &str) -> bool {
    let license = license.to_lowercase();
    license == "proprietary" || license.starts_with("cc-by-nc")
}

/// 1.0 when the model's license is compatible with LGPL-2.1, 0.0 otherwise
#[derive(Debug, Default, Clone, Copy)]
pub struct LicenseMetric;

impl LicenseMetric {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Metric for LicenseMetric {
    fn name(&self) -> MetricName {
        MetricName::License
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let license = match card_license(model.hf_metadata().await) {
            Some(license) => Some(license),
            None => repository_license(model.github_metadata().await),
        };

        debug!(model = model.name(), ?license, "Resolved license");

        let compatible = license.as_deref().is_some_and(is_lgpl_compatible);
        Ok(MetricValue::Scalar(if compatible { 1.0 } else { 0.0 }))
    }
}
