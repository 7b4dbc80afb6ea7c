use async_trait::async_trait;
use tracing::debug;

use super::huggingface::DEFAULT_HF_BASE_URL;
use super::url::parse_hf_dataset_id;
use crate::domain::{DomainError, Metadata, MetadataFetcher, MetadataSource};
use crate::infrastructure::http_client::HttpClientTrait;

/// Dataset metadata fetcher; only HuggingFace-hosted datasets are supported
#[derive(Debug)]
pub struct DatasetFetcher<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> DatasetFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_HF_BASE_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> MetadataFetcher for DatasetFetcher<C> {
    async fn try_fetch(&self, url: &str) -> Result<Metadata, DomainError> {
        let Some(dataset_id) = parse_hf_dataset_id(url) else {
            debug!(url, "Unsupported dataset host");
            return Ok(Metadata::new());
        };

        let api_url = format!("{}/api/datasets/{}", self.base_url, dataset_id);
        match self.client.get_json(&api_url, vec![]).await? {
            serde_json::Value::Object(map) => Ok(Metadata::from(map)),
            _ => Err(DomainError::fetch(
                "dataset",
                format!("Unexpected response shape for dataset {}", dataset_id),
            )),
        }
    }

    fn source(&self) -> MetadataSource {
        MetadataSource::Dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_hf_dataset() {
        let client = MockHttpClient::new().with_response(
            "http://hf.test/api/datasets/stanfordnlp/imdb",
            json!({"id": "stanfordnlp/imdb", "downloads": 90000, "description": "Movie reviews"}),
        );

        let fetcher = DatasetFetcher::with_base_url(client, "http://hf.test");
        let metadata = fetcher
            .fetch("https://huggingface.co/datasets/stanfordnlp/imdb")
            .await;

        assert_eq!(metadata.get_str("description"), Some("Movie reviews"));
    }

    #[tokio::test]
    async fn test_other_hosts_yield_empty_without_request() {
        let client = MockHttpClient::new();
        let fetcher = DatasetFetcher::with_base_url(client, "http://hf.test");

        let metadata = fetcher.fetch("https://www.kaggle.com/datasets/x/y").await;

        assert!(metadata.is_empty());
        assert!(fetcher.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_response_yields_empty() {
        let client = MockHttpClient::new()
            .with_response("http://hf.test/api/datasets/squad", json!(["unexpected"]));

        let fetcher = DatasetFetcher::with_base_url(client, "http://hf.test");

        assert!(fetcher.fetch("https://huggingface.co/datasets/squad").await.is_empty());
    }
}
