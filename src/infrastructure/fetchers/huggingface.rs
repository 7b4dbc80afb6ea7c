use async_trait::async_trait;
use tracing::debug;

use super::url::parse_hf_model_id;
use crate::domain::{DomainError, Metadata, MetadataFetcher, MetadataSource};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_HF_BASE_URL: &str = "https://huggingface.co";

/// HuggingFace model API fetcher
///
/// The model card README is attached under `readme` when it can be
/// downloaded; its absence does not fail the fetch.
#[derive(Debug)]
pub struct HuggingFaceFetcher<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> HuggingFaceFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_HF_BASE_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn model_api_url(&self, model_id: &str) -> String {
        format!("{}/api/models/{}", self.base_url, model_id)
    }

    fn readme_url(&self, model_id: &str) -> String {
        format!("{}/{}/raw/main/README.md", self.base_url, model_id)
    }
}

#[async_trait]
impl<C: HttpClientTrait> MetadataFetcher for HuggingFaceFetcher<C> {
    async fn try_fetch(&self, url: &str) -> Result<Metadata, DomainError> {
        let model_id = parse_hf_model_id(url).ok_or_else(|| {
            DomainError::fetch("huggingface", format!("Not a HuggingFace model URL: {}", url))
        })?;

        let body = self.client.get_json(&self.model_api_url(&model_id), vec![]).await?;
        let serde_json::Value::Object(map) = body else {
            return Err(DomainError::fetch(
                "huggingface",
                format!("Unexpected response shape for model {}", model_id),
            ));
        };

        let mut metadata = Metadata::from(map);

        match self.client.get_text(&self.readme_url(&model_id), vec![]).await {
            Ok(readme) => metadata.insert("readme", readme),
            Err(e) => debug!(model_id = %model_id, error = %e, "README not available"),
        }

        debug!(model_id = %model_id, keys = metadata.as_map().len(), "Fetched HuggingFace metadata");
        Ok(metadata)
    }

    fn source(&self) -> MetadataSource {
        MetadataSource::HuggingFace
    }
}
