//! Artifact store trait

use async_trait::async_trait;

use super::{ArtifactId, ArtifactType, StoredArtifact};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence for artifact documents, one document per artifact ID
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync + std::fmt::Debug {
    /// Retrieves an artifact by ID
    async fn get(&self, id: &ArtifactId) -> Result<Option<StoredArtifact>, DomainError>;

    /// Creates or replaces the artifact stored under `id`
    async fn put(&self, id: &ArtifactId, artifact: StoredArtifact) -> Result<(), DomainError>;

    /// Deletes an artifact, returns true if it existed
    async fn delete(&self, id: &ArtifactId) -> Result<bool, DomainError>;

    /// Lists every readable artifact; unreadable documents are skipped
    async fn list(&self) -> Result<Vec<StoredArtifact>, DomainError>;

    /// Lists artifacts of one type
    async fn list_by_type(
        &self,
        artifact_type: ArtifactType,
    ) -> Result<Vec<StoredArtifact>, DomainError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|a| a.artifact_type() == artifact_type)
            .collect())
    }

    /// Removes every artifact
    async fn clear(&self) -> Result<(), DomainError>;
}
