//! Evaluable model artifact with lazily fetched metadata

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::links::ModelLinks;
use crate::domain::artifact::ArtifactId;
use crate::domain::metadata::{Metadata, MetadataFetcher, MetadataSource, UnavailableFetcher};

/// One fetcher per metadata source
#[derive(Debug, Clone)]
pub struct MetadataFetchers {
    pub huggingface: Arc<dyn MetadataFetcher>,
    pub github: Arc<dyn MetadataFetcher>,
    pub dataset: Arc<dyn MetadataFetcher>,
}

impl MetadataFetchers {
    pub fn new(
        huggingface: Arc<dyn MetadataFetcher>,
        github: Arc<dyn MetadataFetcher>,
        dataset: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            huggingface,
            github,
            dataset,
        }
    }

    /// Fetchers that never return metadata
    pub fn unavailable() -> Self {
        Self {
            huggingface: Arc::new(UnavailableFetcher(MetadataSource::HuggingFace)),
            github: Arc::new(UnavailableFetcher(MetadataSource::GitHub)),
            dataset: Arc::new(UnavailableFetcher(MetadataSource::Dataset)),
        }
    }
}

impl Default for MetadataFetchers {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// A model under evaluation
///
/// Each metadata snapshot is fetched at most once per instance and then
/// cached; snapshots can also be seeded up front.
#[derive(Debug)]
pub struct ModelArtifact {
    id: ArtifactId,
    name: String,
    links: ModelLinks,
    fetchers: MetadataFetchers,
    hf_metadata: OnceCell<Metadata>,
    github_metadata: OnceCell<Metadata>,
    dataset_metadata: OnceCell<Metadata>,
}

impl ModelArtifact {
    pub fn new(
        id: ArtifactId,
        name: impl Into<String>,
        links: ModelLinks,
        fetchers: MetadataFetchers,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            links,
            fetchers,
            hf_metadata: OnceCell::new(),
            github_metadata: OnceCell::new(),
            dataset_metadata: OnceCell::new(),
        }
    }

    /// Build an artifact whose metadata comes only from seeded snapshots
    pub fn offline(id: ArtifactId, name: impl Into<String>, links: ModelLinks) -> Self {
        Self::new(id, name, links, MetadataFetchers::unavailable())
    }

    pub fn with_hf_metadata(mut self, metadata: Metadata) -> Self {
        self.hf_metadata = OnceCell::new_with(Some(metadata));
        self
    }

    pub fn with_github_metadata(mut self, metadata: Metadata) -> Self {
        self.github_metadata = OnceCell::new_with(Some(metadata));
        self
    }

    pub fn with_dataset_metadata(mut self, metadata: Metadata) -> Self {
        self.dataset_metadata = OnceCell::new_with(Some(metadata));
        self
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &ModelLinks {
        &self.links
    }

    pub fn model_link(&self) -> &str {
        &self.links.model_link
    }

    pub fn code_link(&self) -> Option<&str> {
        self.links.code_link.as_deref()
    }

    pub fn dataset_link(&self) -> Option<&str> {
        self.links.dataset_link.as_deref()
    }

    /// HuggingFace model metadata (empty if unavailable)
    pub async fn hf_metadata(&self) -> &Metadata {
        self.hf_metadata
            .get_or_init(|| self.fetchers.huggingface.fetch(&self.links.model_link))
            .await
    }

    /// GitHub repository metadata (empty if there is no code link or the fetch failed)
    pub async fn github_metadata(&self) -> &Metadata {
        self.github_metadata
            .get_or_init(|| fetch_optional(&self.fetchers.github, self.links.code_link.as_deref()))
            .await
    }

    /// Dataset metadata (empty if there is no dataset link or the fetch failed)
    pub async fn dataset_metadata(&self) -> &Metadata {
        self.dataset_metadata
            .get_or_init(|| {
                fetch_optional(&self.fetchers.dataset, self.links.dataset_link.as_deref())
            })
            .await
    }
}

async fn fetch_optional(fetcher: &Arc<dyn MetadataFetcher>, link: Option<&str>) -> Metadata {
    match link {
        Some(url) => fetcher.fetch(url).await,
        None => Metadata::new(),
    }
}
