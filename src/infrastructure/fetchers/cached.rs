use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::{DomainError, Metadata, MetadataFetcher, MetadataSource};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Fetcher wrapper that caches snapshots per URL with a TTL
///
/// Only non-empty snapshots are cached, so a failed fetch is retried on
/// the next call.
#[derive(Debug)]
pub struct CachedFetcher<F: MetadataFetcher> {
    inner: F,
    cache: Cache<String, Arc<Metadata>>,
}

impl<F: MetadataFetcher> CachedFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: F, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self { inner, cache }
    }

    /// Invalidate a single URL
    pub async fn invalidate(&self, url: &str) {
        self.cache.invalidate(url).await;
    }

    /// Invalidate all cached snapshots
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn cache_size(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<F: MetadataFetcher> MetadataFetcher for CachedFetcher<F> {
    async fn try_fetch(&self, url: &str) -> Result<Metadata, DomainError> {
        if let Some(cached) = self.cache.get(url).await {
            debug!(source = %self.inner.source(), url, "Cache hit for metadata");
            return Ok((*cached).clone());
        }

        debug!(source = %self.inner.source(), url, "Cache miss, fetching metadata");

        let metadata = self.inner.try_fetch(url).await?;
        if !metadata.is_empty() {
            self.cache
                .insert(url.to_string(), Arc::new(metadata.clone()))
                .await;
        }

        Ok(metadata)
    }

    fn source(&self) -> MetadataSource {
        self.inner.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::MockFetcher;

    const URL: &str = "https://huggingface.co/gpt2";

    #[tokio::test]
    async fn test_second_fetch_is_cached() {
        let inner = MockFetcher::new(MetadataSource::HuggingFace)
            .with_response(URL, Metadata::new().with("likes", 5));
        let cached = CachedFetcher::new(inner, DEFAULT_CACHE_TTL);

        let first = cached.fetch(URL).await;
        let second = cached.fetch(URL).await;

        assert_eq!(first, second);
        assert_eq!(second.get_u64("likes"), Some(5));
        assert_eq!(cached.inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_results_not_cached() {
        let inner = MockFetcher::new(MetadataSource::GitHub);
        let cached = CachedFetcher::new(inner, DEFAULT_CACHE_TTL);

        assert!(cached.fetch(URL).await.is_empty());
        assert!(cached.fetch(URL).await.is_empty());
        assert_eq!(cached.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_errors_not_cached() {
        let inner = MockFetcher::new(MetadataSource::Dataset).with_error("timeout");
        let cached = CachedFetcher::new(inner, DEFAULT_CACHE_TTL);

        assert!(cached.try_fetch(URL).await.is_err());
        assert!(cached.try_fetch(URL).await.is_err());
        assert_eq!(cached.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_refetches() {
        let inner = MockFetcher::new(MetadataSource::HuggingFace)
            .with_response(URL, Metadata::new().with("likes", 1));
        let cached = CachedFetcher::new(inner, DEFAULT_CACHE_TTL);

        cached.fetch(URL).await;
        cached.invalidate(URL).await;
        cached.fetch(URL).await;

        assert_eq!(cached.inner.call_count(), 2);
    }
}
