//! Artifact domain - registered models, datasets and code

mod entity;
mod repository;
mod validation;

pub use entity::{
    name_from_url, ArtifactData, ArtifactId, ArtifactMetadata, ArtifactType, StoredArtifact,
};
pub use repository::ArtifactStore;
pub use validation::{
    validate_artifact_id, validate_source_url, ArtifactValidationError, MAX_ARTIFACT_ID_LENGTH,
};

#[cfg(test)]
pub use repository::MockArtifactStore;
