//! Model domain - the evaluable unit consumed by metrics

mod entity;
mod links;

pub use entity::{MetadataFetchers, ModelArtifact};
pub use links::{discover_code_link, discover_dataset_link, ModelLinks};
