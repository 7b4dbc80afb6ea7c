use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::url::parse_github_repo;
use crate::domain::{DomainError, Metadata, MetadataFetcher, MetadataSource};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub REST API fetcher
///
/// The repository document is enriched with `pull_requests` (closed, most
/// recent 100), `tree` (recursive listing of the default branch) and
/// `contributors`. A failed sub-request only omits its key.
#[derive(Debug)]
pub struct GitHubFetcher<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> GitHubFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_GITHUB_API_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.auth_header = token
            .filter(|t| !t.trim().is_empty())
            .map(|t| format!("Bearer {}", t.trim()));
        self
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Accept", "application/vnd.github+json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, owner, repo)
    }

    /// GET a sub-resource, logging and discarding failures
    async fn optional_get(&self, url: &str) -> Option<Value> {
        match self.client.get_json(url, self.headers()).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(url, error = %e, "GitHub sub-request failed");
                None
            }
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> MetadataFetcher for GitHubFetcher<C> {
    async fn try_fetch(&self, url: &str) -> Result<Metadata, DomainError> {
        let (owner, repo) = parse_github_repo(url).ok_or_else(|| {
            DomainError::fetch("github", format!("Not a GitHub repository URL: {}", url))
        })?;

        let repo_url = self.repo_url(&owner, &repo);
        let Value::Object(map) = self.client.get_json(&repo_url, self.headers()).await? else {
            return Err(DomainError::fetch(
                "github",
                format!("Unexpected response shape for {}/{}", owner, repo),
            ));
        };
        let mut metadata = Metadata::from(map);

        let pulls_url = format!("{}/pulls?state=closed&per_page=100", repo_url);
        if let Some(pulls @ Value::Array(_)) = self.optional_get(&pulls_url).await {
            metadata.insert("pull_requests", pulls);
        }

        let branch = metadata
            .get_str("default_branch")
            .unwrap_or("main")
            .to_string();
        let tree_url = format!("{}/git/trees/{}?recursive=1", repo_url, branch);
        if let Some(Value::Object(mut tree)) = self.optional_get(&tree_url).await {
            if let Some(entries @ Value::Array(_)) = tree.remove("tree") {
                metadata.insert("tree", entries);
            }
        }

        let contributors_url = format!("{}/contributors?per_page=100", repo_url);
        if let Some(contributors @ Value::Array(_)) = self.optional_get(&contributors_url).await {
            metadata.insert("contributors", contributors);
        }

        debug!(owner = %owner, repo = %repo, "Fetched GitHub metadata");
        Ok(metadata)
    }

    fn source(&self) -> MetadataSource {
        MetadataSource::GitHub
    }
}
