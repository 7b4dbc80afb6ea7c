//! Artifact entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::validation::{validate_artifact_id, ArtifactValidationError};

/// Number of hex characters kept from the ingest digest
const DERIVED_ID_LENGTH: usize = 10;

/// Artifact identifier - alphanumeric + hyphens
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Create a new ArtifactId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ArtifactValidationError> {
        let id = id.into();
        validate_artifact_id(&id)?;
        Ok(Self(id))
    }

    /// Derive the stable ingest ID for a type and source URL
    pub fn derive(artifact_type: ArtifactType, url: &str) -> Self {
        let digest = Sha256::digest(format!("{}:{}", artifact_type, url).as_bytes());
        let mut id = hex::encode(digest);
        id.truncate(DERIVED_ID_LENGTH);
        Self(id)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = ArtifactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of registered artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Model,
    Dataset,
    Code,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Dataset => "dataset",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = ArtifactValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "dataset" => Ok(Self::Dataset),
            "code" => Ok(Self::Code),
            _ => Err(ArtifactValidationError::InvalidType {
                value: s.to_string(),
            }),
        }
    }
}

/// Identity block of a stored artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub id: ArtifactId,
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
}

/// Source locations of a stored artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactData {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_url: Option<String>,
}

impl ArtifactData {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_code_url(mut self, url: impl Into<String>) -> Self {
        self.code_url = Some(url.into());
        self
    }

    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = Some(url.into());
        self
    }
}

/// One persisted artifact document
///
/// `scores` is kept as raw JSON: older records store it as a serialized
/// string, and a malformed value must not make the whole record unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub metadata: ArtifactMetadata,
    pub data: ArtifactData,
    #[serde(
        default,
        alias = "metadata_json",
        skip_serializing_if = "Option::is_none"
    )]
    pub scores: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<DateTime<Utc>>,
}

impl StoredArtifact {
    pub fn new(
        id: ArtifactId,
        name: impl Into<String>,
        artifact_type: ArtifactType,
        data: ArtifactData,
    ) -> Self {
        Self {
            metadata: ArtifactMetadata {
                name: name.into(),
                id,
                artifact_type,
            },
            data,
            scores: None,
            parents: Vec::new(),
            rated_at: None,
        }
    }

    pub fn id(&self) -> &ArtifactId {
        &self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn artifact_type(&self) -> ArtifactType {
        self.metadata.artifact_type
    }

    pub fn is_model(&self) -> bool {
        self.metadata.artifact_type == ArtifactType::Model
    }

    /// Previously persisted net score, if the stored scores are readable
    pub fn net_score(&self) -> Option<f64> {
        match self.scores.as_ref()? {
            serde_json::Value::Object(map) => map.get("net_score")?.as_f64(),
            serde_json::Value::String(raw) => {
                let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
                parsed.get("net_score")?.as_f64()
            }
            _ => None,
        }
    }
}

/// Derive a display name from a source URL (last non-empty path segment)
pub fn name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');

    match trimmed.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => url.to_string(),
    }
}
