//! In-memory artifact store

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{ArtifactId, ArtifactStore, DomainError, StoredArtifact};

/// Thread-safe in-memory artifact store
///
/// Artifacts are kept ordered by id. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<BTreeMap<String, StoredArtifact>>,
}

impl InMemoryArtifactStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with artifacts, keyed by their own ids
    pub fn with_artifacts(artifacts: Vec<StoredArtifact>) -> Self {
        let map = artifacts
            .into_iter()
            .map(|a| (a.id().as_str().to_string(), a))
            .collect();

        Self {
            artifacts: RwLock::new(map),
        }
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn get(&self, id: &ArtifactId) -> Result<Option<StoredArtifact>, DomainError> {
        let artifacts = self.artifacts.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(artifacts.get(id.as_str()).cloned())
    }

    async fn put(&self, id: &ArtifactId, artifact: StoredArtifact) -> Result<(), DomainError> {
        let mut artifacts = self.artifacts.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        artifacts.insert(id.as_str().to_string(), artifact);
        Ok(())
    }

    async fn delete(&self, id: &ArtifactId) -> Result<bool, DomainError> {
        let mut artifacts = self.artifacts.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(artifacts.remove(id.as_str()).is_some())
    }

    async fn list(&self) -> Result<Vec<StoredArtifact>, DomainError> {
        let artifacts = self.artifacts.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(artifacts.values().cloned().collect())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut artifacts = self.artifacts.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        artifacts.clear();
        Ok(())
    }
}
