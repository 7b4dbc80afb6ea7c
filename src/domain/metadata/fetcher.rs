//! Metadata fetcher trait

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::warn;

use super::{Metadata, MetadataSource};
use crate::domain::DomainError;

/// Retrieves metadata for a URL from one source platform
///
/// `fetch` never fails: network errors, rate limiting and malformed
/// responses all collapse to an empty snapshot.
#[async_trait]
pub trait MetadataFetcher: Send + Sync + Debug {
    /// Fetch metadata, surfacing the failure reason
    async fn try_fetch(&self, url: &str) -> Result<Metadata, DomainError>;

    /// The platform this fetcher talks to
    fn source(&self) -> MetadataSource;

    /// Fetch metadata, returning an empty snapshot on any failure
    async fn fetch(&self, url: &str) -> Metadata {
        match self.try_fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(source = %self.source(), url, error = %e, "Metadata unavailable");
                Metadata::new()
            }
        }
    }
}

/// Fetcher used when a source is not configured; always returns nothing
#[derive(Debug, Clone, Copy)]
pub struct UnavailableFetcher(pub MetadataSource);

#[async_trait]
impl MetadataFetcher for UnavailableFetcher {
    async fn try_fetch(&self, _url: &str) -> Result<Metadata, DomainError> {
        Ok(Metadata::new())
    }

    fn source(&self) -> MetadataSource {
        self.0
    }
}
