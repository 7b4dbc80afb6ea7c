//! Metadata fetcher implementations

mod cached;
mod dataset;
mod github;
mod huggingface;
mod url;

pub use cached::{CachedFetcher, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use dataset::DatasetFetcher;
pub use github::{GitHubFetcher, DEFAULT_GITHUB_API_URL};
pub use huggingface::{HuggingFaceFetcher, DEFAULT_HF_BASE_URL};
pub use url::{parse_github_repo, parse_hf_dataset_id, parse_hf_model_id};
