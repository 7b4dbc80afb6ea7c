//! Domain layer - Core business logic and entities

pub mod artifact;
pub mod error;
pub mod lineage;
pub mod llm;
pub mod metadata;
pub mod metric;
pub mod model;
pub mod rating;

pub use artifact::{
    ArtifactData, ArtifactId, ArtifactMetadata, ArtifactStore, ArtifactType,
    ArtifactValidationError, StoredArtifact,
};
pub use error::DomainError;
pub use lineage::{LineageEdge, LineageGraph, LineageNode};
pub use llm::{Completion, CompletionRequest, LlmProvider};
pub use metadata::{Metadata, MetadataFetcher, MetadataSource};
pub use metric::{Metric, MetricName, MetricResult, MetricValue, SizeScore};
pub use model::{MetadataFetchers, ModelArtifact, ModelLinks};
pub use rating::{NetScoreWeights, Rating};
