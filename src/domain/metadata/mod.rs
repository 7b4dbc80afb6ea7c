//! Metadata domain - snapshots harvested from HuggingFace, GitHub and dataset hosts

mod entity;
mod fetcher;

pub use entity::{Metadata, MetadataSource};
pub use fetcher::{MetadataFetcher, UnavailableFetcher};

#[cfg(test)]
pub use fetcher::mock::MockFetcher;
