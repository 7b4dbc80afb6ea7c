//! Artifact validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for artifact IDs
pub const MAX_ARTIFACT_ID_LENGTH: usize = 64;

/// Regex pattern for valid artifact IDs (alphanumeric + hyphens)
static ARTIFACT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").unwrap());

/// Artifact validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactValidationError {
    /// Artifact ID is empty
    EmptyId,
    /// Artifact ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// Artifact ID contains invalid characters
    InvalidIdFormat { id: String },
    /// Artifact type is not one of model, dataset, code
    InvalidType { value: String },
    /// Source URL is empty
    EmptyUrl,
}

impl fmt::Display for ArtifactValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Artifact ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Artifact ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => {
                write!(
                    f,
                    "Invalid artifact ID format '{}': must be alphanumeric with hyphens",
                    id
                )
            }
            Self::InvalidType { value } => {
                write!(
                    f,
                    "Invalid artifact type '{}': expected model, dataset or code",
                    value
                )
            }
            Self::EmptyUrl => write!(f, "Artifact URL cannot be empty"),
        }
    }
}

impl std::error::Error for ArtifactValidationError {}

impl From<ArtifactValidationError> for crate::domain::DomainError {
    fn from(err: ArtifactValidationError) -> Self {
        match err {
            ArtifactValidationError::EmptyId
            | ArtifactValidationError::IdTooLong { .. }
            | ArtifactValidationError::InvalidIdFormat { .. } => Self::invalid_id(err.to_string()),
            _ => Self::validation(err.to_string()),
        }
    }
}

/// Validates an artifact ID
pub fn validate_artifact_id(id: &str) -> Result<(), ArtifactValidationError> {
    if id.is_empty() {
        return Err(ArtifactValidationError::EmptyId);
    }

    if id.len() > MAX_ARTIFACT_ID_LENGTH {
        return Err(ArtifactValidationError::IdTooLong {
            length: id.len(),
            max: MAX_ARTIFACT_ID_LENGTH,
        });
    }

    if !ARTIFACT_ID_PATTERN.is_match(id) {
        return Err(ArtifactValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validates a source URL before ingest
pub fn validate_source_url(url: &str) -> Result<(), ArtifactValidationError> {
    if url.trim().is_empty() {
        return Err(ArtifactValidationError::EmptyUrl);
    }

    Ok(())
}
