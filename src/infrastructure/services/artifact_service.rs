//! Artifact service - registration, lookup and lineage of stored artifacts

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::artifact::{name_from_url, validate_source_url};
use crate::domain::{
    ArtifactData, ArtifactId, ArtifactMetadata, ArtifactStore, ArtifactType, DomainError,
    LineageGraph, MetadataFetchers, StoredArtifact,
};
use crate::infrastructure::metrics::{card_license, is_restricted, repository_license};

/// Query name that enumerates every artifact
pub const WILDCARD_QUERY: &str = "*";

/// Patterns made only of these characters are treated as literal names
static LITERAL_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._\-]+$").unwrap());

/// One entry of a listing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ArtifactType>,
}

impl ArtifactQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Query matching every artifact
    pub fn all() -> Self {
        Self::new(WILDCARD_QUERY)
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = ArtifactType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    fn accepts(&self, artifact_type: ArtifactType) -> bool {
        self.types.is_empty() || self.types.contains(&artifact_type)
    }
}

/// Verdict on fine-tuning and serving a model together with a code repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCheck {
    pub ok: bool,
    pub rationale: String,
}

impl LicenseCheck {
    fn assess(model_license: Option<&str>, repo_license: Option<&str>) -> Self {
        let Some(model_license) = model_license else {
            return Self::rejected("Model declares no license.".to_string());
        };
        if is_restricted(model_license) {
            return Self::rejected(format!(
                "Model license {} is non-commercial or restricted.",
                model_license
            ));
        }

        match repo_license {
            Some(repo) if is_restricted(repo) => Self::rejected(format!(
                "Repo license {} is non-commercial or restricted.",
                repo
            )),
            repo => Self {
                ok: true,
                rationale: format!(
                    "Model license={}, Repo license={} compatible for fine-tune+inference.",
                    model_license,
                    repo.unwrap_or("unknown")
                ),
            },
        }
    }

    fn rejected(rationale: String) -> Self {
        Self {
            ok: false,
            rationale,
        }
    }
}

/// Artifact service for registry operations
#[derive(Debug)]
pub struct ArtifactService {
    store: Arc<dyn ArtifactStore>,
    fetchers: MetadataFetchers,
}

impl ArtifactService {
    /// Create a new ArtifactService over the given store
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            fetchers: MetadataFetchers::unavailable(),
        }
    }

    /// Metadata sources consulted by [`ArtifactService::license_check`]
    pub fn with_fetchers(mut self, fetchers: MetadataFetchers) -> Self {
        self.fetchers = fetchers;
        self
    }

    /// Register an artifact from its source URL
    pub async fn create(
        &self,
        artifact_type: ArtifactType,
        url: &str,
    ) -> Result<StoredArtifact, DomainError> {
        validate_source_url(url)?;

        let duplicate = self
            .store
            .list_by_type(artifact_type)
            .await?
            .into_iter()
            .any(|a| a.data.url == url);
        if duplicate {
            return Err(DomainError::conflict(format!(
                "A {} with URL '{}' already exists",
                artifact_type, url
            )));
        }

        let id = ArtifactId::derive(artifact_type, url);
        let mut data = ArtifactData::new(url);
        data.download_url = Some(url.to_string());

        let artifact = StoredArtifact::new(id.clone(), name_from_url(url), artifact_type, data);
        self.store.put(&id, artifact.clone()).await?;

        info!(artifact_id = %id, artifact_type = %artifact_type, name = artifact.name(), "Artifact registered");
        Ok(artifact)
    }

    /// Get an artifact by type and ID
    pub async fn get(
        &self,
        artifact_type: ArtifactType,
        id: &str,
    ) -> Result<StoredArtifact, DomainError> {
        let artifact_id = self.parse_id(id)?;
        self.get_typed(artifact_type, &artifact_id).await
    }

    /// Replace the source locations of an artifact
    ///
    /// A changed source URL invalidates the previous rating.
    pub async fn update(
        &self,
        artifact_type: ArtifactType,
        id: &str,
        data: ArtifactData,
    ) -> Result<StoredArtifact, DomainError> {
        validate_source_url(&data.url)?;

        let artifact_id = self.parse_id(id)?;
        let mut artifact = self.get_typed(artifact_type, &artifact_id).await?;

        if artifact.data.url != data.url {
            debug!(artifact_id = %artifact_id, "Source URL changed, dropping rating");
            artifact.scores = None;
            artifact.parents.clear();
            artifact.rated_at = None;
        }
        artifact.data = data;

        self.store.put(&artifact_id, artifact.clone()).await?;

        info!(artifact_id = %artifact_id, "Artifact updated");
        Ok(artifact)
    }

    /// Delete an artifact by type and ID
    pub async fn delete(&self, artifact_type: ArtifactType, id: &str) -> Result<(), DomainError> {
        let artifact_id = self.parse_id(id)?;
        self.get_typed(artifact_type, &artifact_id).await?;

        if !self.store.delete(&artifact_id).await? {
            return Err(DomainError::not_found(format!("Artifact '{}' not found", id)));
        }

        info!(artifact_id = %artifact_id, "Artifact deleted");
        Ok(())
    }

    /// Artifacts whose name equals `name`
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<ArtifactMetadata>, DomainError> {
        let matches = self.metadata_where(|n| n == name).await?;

        if matches.is_empty() {
            return Err(DomainError::not_found(format!(
                "No artifact named '{}'",
                name
            )));
        }

        Ok(matches)
    }

    /// Artifacts whose name matches `pattern`
    ///
    /// A pattern that is a plain name once `^`/`$` anchors are removed is
    /// compared for equality; anything else is a regex search.
    pub async fn find_by_regex(&self, pattern: &str) -> Result<Vec<ArtifactMetadata>, DomainError> {
        let stripped = pattern.strip_prefix('^').unwrap_or(pattern);
        let stripped = stripped.strip_suffix('$').unwrap_or(stripped);

        let matches = if LITERAL_NAME_PATTERN.is_match(stripped) {
            self.metadata_where(|n| n == stripped).await?
        } else {
            let regex = Regex::new(pattern).map_err(|e| {
                DomainError::validation(format!("Invalid regular expression '{}': {}", pattern, e))
            })?;
            self.metadata_where(|n| regex.is_match(n)).await?
        };

        if matches.is_empty() {
            return Err(DomainError::not_found(format!(
                "No artifact found under regex '{}'",
                pattern
            )));
        }

        Ok(matches)
    }

    /// Resolve listing queries, concatenating results in query order
    ///
    /// The wildcard enumerates every artifact once across all queries; a
    /// named query yields its lowest-id exact match.
    pub async fn list(&self, queries: &[ArtifactQuery]) -> Result<Vec<ArtifactMetadata>, DomainError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let artifacts = self.store.list().await?;
        let mut results = Vec::new();
        let mut seen: HashSet<ArtifactId> = HashSet::new();

        for query in queries {
            if query.name == WILDCARD_QUERY {
                for artifact in &artifacts {
                    if query.accepts(artifact.artifact_type()) && seen.insert(artifact.id().clone()) {
                        results.push(artifact.metadata.clone());
                    }
                }
                continue;
            }

            let best = artifacts
                .iter()
                .filter(|a| a.name() == query.name && query.accepts(a.artifact_type()))
                .min_by(|a, b| a.id().cmp(b.id()))
                .ok_or_else(|| {
                    DomainError::not_found(format!("No artifact named '{}'", query.name))
                })?;

            results.push(best.metadata.clone());
        }

        Ok(results)
    }

    /// Remove every artifact
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.store.clear().await?;
        info!("Registry reset");
        Ok(())
    }

    /// One-level lineage of a model: its recorded parents among stored models
    pub async fn lineage(&self, id: &str) -> Result<LineageGraph, DomainError> {
        let artifact_id = self.parse_id(id)?;
        let artifact = self.get_typed(ArtifactType::Model, &artifact_id).await?;
        let candidates = self.store.list_by_type(ArtifactType::Model).await?;

        Ok(LineageGraph::around(&artifact, &candidates))
    }

    /// Check the model's license against a code repository's license
    ///
    /// The repository defaults to the model's recorded code URL. An unknown
    /// repository license does not fail the check.
    pub async fn license_check(
        &self,
        id: &str,
        code_url: Option<&str>,
    ) -> Result<LicenseCheck, DomainError> {
        if let Some(url) = code_url {
            validate_source_url(url)?;
        }

        let artifact_id = self.parse_id(id)?;
        let artifact = self.get_typed(ArtifactType::Model, &artifact_id).await?;

        let hf = self.fetchers.huggingface.fetch(&artifact.data.url).await;
        let model_license = card_license(&hf);

        let repo_license = match code_url.or(artifact.data.code_url.as_deref()) {
            Some(url) => repository_license(&self.fetchers.github.fetch(url).await),
            None => None,
        };

        let check = LicenseCheck::assess(model_license.as_deref(), repo_license.as_deref());
        info!(
            artifact_id = %artifact_id,
            ?model_license,
            ?repo_license,
            ok = check.ok,
            "License checked"
        );
        Ok(check)
    }

    async fn get_typed(
        &self,
        artifact_type: ArtifactType,
        id: &ArtifactId,
    ) -> Result<StoredArtifact, DomainError> {
        let artifact = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Artifact '{}' not found", id)))?;

        if artifact.artifact_type() != artifact_type {
            return Err(DomainError::validation(format!(
                "Artifact '{}' is a {}, not a {}",
                id,
                artifact.artifact_type(),
                artifact_type
            )));
        }

        Ok(artifact)
    }

    async fn metadata_where(
        &self,
        predicate: impl Fn(&str) -> bool,
    ) -> Result<Vec<ArtifactMetadata>, DomainError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|a| predicate(a.name()))
            .map(|a| a.metadata)
            .collect())
    }

    fn parse_id(&self, id: &str) -> Result<ArtifactId, DomainError> {
        ArtifactId::new(id).map_err(|e| DomainError::validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::MockFetcher;
    use crate::domain::{Metadata, MetadataSource};
    use crate::infrastructure::storage::InMemoryArtifactStore;
    use serde_json::json;

    fn create_service() -> ArtifactService {
        ArtifactService::new(Arc::new(InMemoryArtifactStore::new()))
    }

    fn stored(id: &str, name: &str, artifact_type: ArtifactType) -> StoredArtifact {
        StoredArtifact::new(
            ArtifactId::new(id).unwrap(),
            name,
            artifact_type,
            ArtifactData::new(format!("https://huggingface.co/{}", name)),
        )
    }

    fn seeded(artifacts: Vec<StoredArtifact>) -> ArtifactService {
        ArtifactService::new(Arc::new(InMemoryArtifactStore::with_artifacts(artifacts)))
    }

    #[tokio::test]
    async fn test_create_artifact() {
        let service = create_service();

        let artifact = service
            .create(ArtifactType::Model, "https://huggingface.co/google/gemma-2b")
            .await
            .unwrap();

        assert_eq!(artifact.name(), "gemma-2b");
        assert_eq!(
            artifact.id(),
            &ArtifactId::derive(ArtifactType::Model, "https://huggingface.co/google/gemma-2b")
        );
        assert_eq!(
            artifact.data.download_url.as_deref(),
            Some("https://huggingface.co/google/gemma-2b")
        );

        let fetched = service
            .get(ArtifactType::Model, artifact.id().as_str())
            .await
            .unwrap();
        assert_eq!(fetched.name(), "gemma-2b");
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let service = create_service();
        let url = "https://huggingface.co/gpt2";

        service.create(ArtifactType::Model, url).await.unwrap();
        let result = service.create(ArtifactType::Model, url).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        // Same URL under another type is a different artifact
        assert!(service.create(ArtifactType::Code, url).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_url() {
        let service = create_service();
        let result = service.create(ArtifactType::Model, "  ").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_errors() {
        let service = seeded(vec![stored("data-1", "squad", ArtifactType::Dataset)]);

        let invalid = service.get(ArtifactType::Dataset, "bad id").await;
        assert!(matches!(invalid, Err(DomainError::Validation { .. })));

        let missing = service.get(ArtifactType::Dataset, "nope").await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));

        let mismatch = service.get(ArtifactType::Model, "data-1").await;
        assert!(matches!(mismatch, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_keeps_rating_for_same_url() {
        let mut artifact = stored("model-1", "bert", ArtifactType::Model);
        artifact.scores = Some(json!({"net_score": 0.7}));
        let service = seeded(vec![artifact]);

        let data = ArtifactData::new("https://huggingface.co/bert")
            .with_code_url("https://github.com/google-research/bert");
        let updated = service
            .update(ArtifactType::Model, "model-1", data)
            .await
            .unwrap();

        assert_eq!(updated.net_score(), Some(0.7));
        assert_eq!(
            updated.data.code_url.as_deref(),
            Some("https://github.com/google-research/bert")
        );
    }

    #[tokio::test]
    async fn test_update_new_url_drops_rating() {
        let mut artifact = stored("model-1", "bert", ArtifactType::Model);
        artifact.scores = Some(json!({"net_score": 0.7}));
        artifact.parents = vec!["bert-base".to_string()];
        let service = seeded(vec![artifact]);

        let updated = service
            .update(
                ArtifactType::Model,
                "model-1",
                ArtifactData::new("https://huggingface.co/bert-large"),
            )
            .await
            .unwrap();

        assert!(updated.scores.is_none());
        assert!(updated.parents.is_empty());
        assert_eq!(updated.name(), "bert");
    }

    #[tokio::test]
    async fn test_delete_artifact() {
        let service = seeded(vec![stored("model-1", "bert", ArtifactType::Model)]);

        let mismatch = service.delete(ArtifactType::Code, "model-1").await;
        assert!(matches!(mismatch, Err(DomainError::Validation { .. })));

        service.delete(ArtifactType::Model, "model-1").await.unwrap();

        let again = service.delete(ArtifactType::Model, "model-1").await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let service = seeded(vec![
            stored("a1", "bert", ArtifactType::Model),
            stored("a2", "bert", ArtifactType::Code),
            stored("a3", "bert-large", ArtifactType::Model),
        ]);

        let found = service.find_by_name("bert").await.unwrap();
        assert_eq!(found.len(), 2);

        let missing = service.find_by_name("gpt").await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_regex_literal_is_exact() {
        let service = seeded(vec![
            stored("a1", "bert", ArtifactType::Model),
            stored("a2", "bert-large", ArtifactType::Model),
        ]);

        let found = service.find_by_regex("^bert$").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "bert");

        let found = service.find_by_regex("bert").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_regex_search() {
        let service = seeded(vec![
            stored("a1", "bert-base", ArtifactType::Model),
            stored("a2", "bert-large", ArtifactType::Model),
            stored("a3", "gpt2", ArtifactType::Model),
        ]);

        let found = service.find_by_regex("bert-(base|large)").await.unwrap();
        assert_eq!(found.len(), 2);

        let found = service.find_by_regex(".*2").await.unwrap();
        assert_eq!(found[0].name, "gpt2");

        let none = service.find_by_regex("^roberta.*").await;
        assert!(matches!(none, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_invalid_regex() {
        let service = seeded(vec![stored("a1", "bert", ArtifactType::Model)]);

        let result = service.find_by_regex("(unclosed").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_wildcard_with_type_filter() {
        let service = seeded(vec![
            stored("a1", "bert", ArtifactType::Model),
            stored("a2", "squad", ArtifactType::Dataset),
            stored("a3", "gpt2", ArtifactType::Model),
        ]);

        let models = service
            .list(&[ArtifactQuery::all().with_types([ArtifactType::Model])])
            .await
            .unwrap();
        assert_eq!(models.len(), 2);

        // Repeated wildcards do not duplicate entries
        let everything = service
            .list(&[ArtifactQuery::all(), ArtifactQuery::all()])
            .await
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_list_named_picks_lowest_id() {
        let service = seeded(vec![
            stored("b2", "bert", ArtifactType::Model),
            stored("a9", "bert", ArtifactType::Model),
            stored("c1", "squad", ArtifactType::Dataset),
        ]);

        let results = service
            .list(&[ArtifactQuery::new("bert"), ArtifactQuery::new("squad")])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id.as_str(), "a9");
        assert_eq!(results[1].name, "squad");

        let missing = service
            .list(&[ArtifactQuery::new("squad").with_types([ArtifactType::Model])])
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_empty_queries() {
        let service = seeded(vec![stored("a1", "bert", ArtifactType::Model)]);
        assert!(service.list(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_query_deserialize() {
        let query: ArtifactQuery =
            serde_json::from_value(json!({"name": "*", "types": ["model", "code"]})).unwrap();
        assert_eq!(query.types, vec![ArtifactType::Model, ArtifactType::Code]);

        let invalid = serde_json::from_value::<ArtifactQuery>(json!({"name": "*", "types": ["package"]}));
        assert!(invalid.is_err());
    }

    #[tokio::test]
    async fn test_reset() {
        let service = seeded(vec![stored("a1", "bert", ArtifactType::Model)]);

        service.reset().await.unwrap();

        assert!(service.list(&[ArtifactQuery::all()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lineage() {
        let mut child = stored("child-1", "tiny-bert", ArtifactType::Model);
        child.parents = vec!["google-bert/bert-base-uncased".to_string()];
        let service = seeded(vec![
            child,
            stored("parent-1", "bert-base-uncased", ArtifactType::Model),
            stored("data-1", "bert-base-uncased", ArtifactType::Dataset),
        ]);

        let graph = service.lineage("child-1").await.unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from_node_artifact_id.as_str(), "parent-1");

        let not_model = service.lineage("data-1").await;
        assert!(matches!(not_model, Err(DomainError::Validation { .. })));
    }

    fn hf_card(license: &str) -> Metadata {
        Metadata::from_value(json!({"cardData": {"license": license}}))
    }

    fn gh_repo(spdx_id: &str) -> Metadata {
        Metadata::from_value(json!({"license": {"spdx_id": spdx_id}}))
    }

    fn licensed_service(hf: MockFetcher, gh: MockFetcher) -> ArtifactService {
        let mut model = stored("model-1", "bert-base", ArtifactType::Model);
        model.data = model.data.with_code_url("https://github.com/org/bert");

        seeded(vec![model, stored("data-1", "squad", ArtifactType::Dataset)]).with_fetchers(
            MetadataFetchers::new(
                Arc::new(hf),
                Arc::new(gh),
                Arc::new(MockFetcher::new(MetadataSource::Dataset)),
            ),
        )
    }

    #[tokio::test]
    async fn test_license_check_compatible() {
        let hf = MockFetcher::new(MetadataSource::HuggingFace)
            .with_response("https://huggingface.co/bert-base", hf_card("apache-2.0"));
        let gh = MockFetcher::new(MetadataSource::GitHub)
            .with_response("https://github.com/org/bert", gh_repo("MIT"));
        let service = licensed_service(hf, gh);

        let check = service.license_check("model-1", None).await.unwrap();

        assert!(check.ok);
        assert_eq!(
            check.rationale,
            "Model license=apache-2.0, Repo license=mit compatible for fine-tune+inference."
        );
    }

    #[tokio::test]
    async fn test_license_check_restricted_model() {
        let hf = MockFetcher::new(MetadataSource::HuggingFace)
            .with_response("https://huggingface.co/bert-base", hf_card("cc-by-nc-4.0"));
        let service = licensed_service(hf, MockFetcher::new(MetadataSource::GitHub));

        let check = service.license_check("model-1", None).await.unwrap();

        assert!(!check.ok);
        assert!(check.rationale.contains("cc-by-nc-4.0"));
        assert!(check.rationale.contains("restricted"));
    }

    #[tokio::test]
    async fn test_license_check_explicit_repository() {
        let hf = MockFetcher::new(MetadataSource::HuggingFace)
            .with_response("https://huggingface.co/bert-base", hf_card("mit"));
        let gh = MockFetcher::new(MetadataSource::GitHub)
            .with_response("https://github.com/org/bert", gh_repo("MIT"))
            .with_response("https://github.com/other/tool", gh_repo("GPL-3.0"));
        let service = licensed_service(hf, gh);

        let check = service
            .license_check("model-1", Some("https://github.com/other/tool"))
            .await
            .unwrap();

        assert!(check.ok);
        assert!(check.rationale.contains("Repo license=gpl-3.0"));
    }

    #[tokio::test]
    async fn test_license_check_without_license() {
        let service = licensed_service(
            MockFetcher::new(MetadataSource::HuggingFace),
            MockFetcher::new(MetadataSource::GitHub),
        );

        let check = service.license_check("model-1", None).await.unwrap();

        assert!(!check.ok);
        assert_eq!(check.rationale, "Model declares no license.");
    }

    #[tokio::test]
    async fn test_license_check_errors() {
        let service = licensed_service(
            MockFetcher::new(MetadataSource::HuggingFace),
            MockFetcher::new(MetadataSource::GitHub),
        );

        let missing = service.license_check("nope", None).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));

        let dataset = service.license_check("data-1", None).await;
        assert!(matches!(dataset, Err(DomainError::Validation { .. })));

        let bad_id = service.license_check("a/b", None).await;
        assert!(matches!(bad_id, Err(DomainError::Validation { .. })));

        let empty_url = service.license_check("model-1", Some("  ")).await;
        assert!(matches!(empty_url, Err(DomainError::Validation { .. })));
    }
}
