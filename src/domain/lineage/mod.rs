//! Lineage domain - parent models declared in card metadata
//!
//! The relation is one level deep: a child lists its base models, and
//! parents are resolved by name against stored artifacts. Cycles are not
//! checked.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::artifact::{ArtifactId, StoredArtifact};
use crate::domain::metadata::Metadata;

/// Keys of the `model_index` document that name a parent
const MODEL_INDEX_PARENT_KEYS: [&str; 3] = ["base_model", "parent_model", "base"];

/// Parent model identifiers declared by HuggingFace metadata, deduplicated in discovery order
///
/// Sources: `cardData.base_model` (string or list), top-level `base_model`,
/// and the `model_index` JSON string.
pub fn extract_parents(hf_metadata: &Metadata) -> Vec<String> {
    let mut parents: Vec<String> = Vec::new();
    let mut push = |candidate: &str| {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !parents.iter().any(|p| p == candidate) {
            parents.push(candidate.to_string());
        }
    };

    if let Some(base_model) = hf_metadata
        .get_object("cardData")
        .and_then(|card| card.get("base_model"))
    {
        match base_model {
            Value::String(name) => push(name),
            Value::Array(names) => names.iter().filter_map(Value::as_str).for_each(&mut push),
            _ => {}
        }
    }

    if let Some(name) = hf_metadata.get_str("base_model") {
        push(name);
    }

    if let Some(raw) = hf_metadata.get_str("model_index") {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(index)) => MODEL_INDEX_PARENT_KEYS
                .iter()
                .filter_map(|key| index.get(*key).and_then(Value::as_str))
                .for_each(&mut push),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "model_index is not valid JSON"),
        }
    }

    parents
}

/// Whether an artifact name refers to one of the parents
///
/// Matching is case-insensitive and loose: equality, containment in either
/// direction, and `org/model` suffix comparison. Short or common names can
/// produce false positives.
pub fn is_parent_match(artifact_name: &str, parents: &[String]) -> bool {
    let artifact = artifact_name.to_lowercase();
    if artifact.is_empty() {
        return false;
    }

    parents.iter().any(|parent| {
        let parent = parent.to_lowercase();
        if parent.is_empty() {
            return false;
        }

        if artifact == parent || artifact.contains(&parent) || parent.contains(&artifact) {
            return true;
        }

        if let Some((_, artifact_model)) = artifact.rsplit_once('/') {
            if artifact_model == parent || artifact_model.contains(&parent) {
                return true;
            }
        }

        if let Some((_, parent_model)) = parent.rsplit_once('/') {
            if parent_model == artifact || artifact.contains(parent_model) {
                return true;
            }
        }

        false
    })
}

/// A model in a lineage graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageNode {
    pub artifact_id: ArtifactId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_score: Option<f64>,
}

impl LineageNode {
    pub fn from_artifact(artifact: &StoredArtifact) -> Self {
        Self {
            artifact_id: artifact.id().clone(),
            name: artifact.name().to_string(),
            net_score: artifact.net_score(),
        }
    }
}

/// Directed parent -> child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub from_node_artifact_id: ArtifactId,
    pub to_node_artifact_id: ArtifactId,
    pub relationship: String,
}

/// One-level lineage around a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageGraph {
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

impl LineageGraph {
    /// Build the graph for `child` from the candidate artifacts
    pub fn around(child: &StoredArtifact, candidates: &[StoredArtifact]) -> Self {
        let mut graph = Self {
            nodes: vec![LineageNode::from_artifact(child)],
            edges: Vec::new(),
        };

        if child.parents.is_empty() {
            return graph;
        }

        for candidate in candidates {
            if candidate.id() == child.id() || !is_parent_match(candidate.name(), &child.parents) {
                continue;
            }

            graph.nodes.push(LineageNode::from_artifact(candidate));
            graph.edges.push(LineageEdge {
                from_node_artifact_id: candidate.id().clone(),
                to_node_artifact_id: child.id().clone(),
                relationship: "base_model".to_string(),
            });
        }

        graph
    }

    pub fn parent_ids(&self) -> impl Iterator<Item = &ArtifactId> {
        self.edges.iter().map(|e| &e.from_node_artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::{ArtifactData, ArtifactType};
    use serde_json::json;

    fn parents(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn stored(id: &str, name: &str, parents: &[&str]) -> StoredArtifact {
        let mut artifact = StoredArtifact::new(
            ArtifactId::new(id).unwrap(),
            name,
            ArtifactType::Model,
            ArtifactData::new(format!("https://huggingface.co/{}", name)),
        );
        artifact.parents = parents.iter().map(|s| s.to_string()).collect();
        artifact
    }

    #[test]
    fn test_extract_from_card_string() {
        let meta = Metadata::from_value(json!({"cardData": {"base_model": "bert-base"}}));
        assert_eq!(extract_parents(&meta), vec!["bert-base"]);
    }

    #[test]
    fn test_extract_from_all_sources_deduplicated() {
        let meta = Metadata::from_value(json!({
            "cardData": {"base_model": ["meta-llama/Llama-2-7b", 3, "mistralai/Mistral-7B"]},
            "base_model": "meta-llama/Llama-2-7b",
            "model_index": "{\"parent_model\": \"google/t5-base\", \"base\": \"mistralai/Mistral-7B\"}"
        }));

        assert_eq!(
            extract_parents(&meta),
            vec!["meta-llama/Llama-2-7b", "mistralai/Mistral-7B", "google/t5-base"]
        );
    }

    #[test]
    fn test_extract_ignores_bad_model_index() {
        let meta = Metadata::from_value(json!({"model_index": "{not json", "base_model": ""}));
        assert!(extract_parents(&meta).is_empty());
    }

    #[test]
    fn test_match_rules() {
        assert!(is_parent_match("BERT-Base", &parents(&["bert-base"])));
        assert!(is_parent_match("bert-base-uncased", &parents(&["bert-base"])));
        assert!(is_parent_match("gpt2", &parents(&["openai-community/gpt2"])));
        assert!(is_parent_match("google/t5-small", &parents(&["t5-small"])));
        assert!(!is_parent_match("roberta-large", &parents(&["bert-base"])));
        assert!(!is_parent_match("", &parents(&["bert-base"])));
    }

    #[test]
    fn test_lineage_graph() {
        let child = stored("child-1", "my-finetune", &["bert-base"]);
        let candidates = vec![
            stored("parent-1", "bert-base", &[]),
            stored("other-1", "resnet-50", &[]),
            child.clone(),
        ];

        let graph = LineageGraph::around(&child, &candidates);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.parent_ids().next().unwrap().as_str(), "parent-1");
        assert_eq!(graph.edges[0].to_node_artifact_id.as_str(), "child-1");
    }

    #[test]
    fn test_lineage_without_parents() {
        let child = stored("child-1", "standalone", &[]);
        let graph = LineageGraph::around(&child, &[stored("x", "standalone-v2", &[])]);

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }
}
