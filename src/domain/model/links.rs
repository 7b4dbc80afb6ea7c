//! Source links of an evaluable model and their discovery from card metadata

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::metadata::Metadata;

const HF_DATASETS_BASE: &str = "https://huggingface.co/datasets";

static GITHUB_REPO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:www\.)?github\.com/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+").unwrap()
});

/// Card fields that sometimes carry the code repository
const CODE_LINK_KEYS: [&str; 3] = ["repository", "github", "code"];

/// The model page plus optional code and dataset locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelLinks {
    pub model_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_link: Option<String>,
}

impl ModelLinks {
    pub fn new(model_link: impl Into<String>) -> Self {
        Self {
            model_link: model_link.into(),
            code_link: None,
            dataset_link: None,
        }
    }

    pub fn with_code_link(mut self, link: impl Into<String>) -> Self {
        self.code_link = Some(link.into());
        self
    }

    pub fn with_dataset_link(mut self, link: impl Into<String>) -> Self {
        self.dataset_link = Some(link.into());
        self
    }

    /// Fill missing code/dataset links from HuggingFace card metadata
    pub fn resolve_from(mut self, hf_metadata: &Metadata) -> Self {
        if self.code_link.is_none() {
            self.code_link = discover_code_link(hf_metadata);
        }

        if self.dataset_link.is_none() {
            self.dataset_link = discover_dataset_link(hf_metadata);
        }

        self
    }
}

/// First GitHub repository referenced by the card data or README
pub fn discover_code_link(hf_metadata: &Metadata) -> Option<String> {
    let card_candidates = hf_metadata
        .get_object("cardData")
        .into_iter()
        .flat_map(|card| CODE_LINK_KEYS.iter().filter_map(move |k| card.get(*k)))
        .filter_map(Value::as_str);

    let readme = hf_metadata.get_str("readme");

    card_candidates
        .chain(readme)
        .find_map(|text| GITHUB_REPO_PATTERN.find(text))
        .map(|m| m.as_str().trim_end_matches(".git").to_string())
}

/// First dataset declared by the card, as a HuggingFace dataset URL
pub fn discover_dataset_link(hf_metadata: &Metadata) -> Option<String> {
    let from_card = hf_metadata
        .get_object("cardData")
        .and_then(|card| card.get("datasets"))
        .and_then(|datasets| match datasets {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
            _ => None,
        });

    let from_tags = || {
        hf_metadata
            .tags()
            .find_map(|tag| tag.strip_prefix("dataset:"))
            .map(str::to_string)
    };

    from_card
        .or_else(from_tags)
        .filter(|id| !id.trim().is_empty())
        .map(|id| format!("{}/{}", HF_DATASETS_BASE, id.trim()))
}
