//! Source URL parsing

const HF_HOST: &str = "huggingface.co/";
const GITHUB_HOST: &str = "github.com/";
const GITHUB_SSH_PREFIX: &str = "git@github.com:";

/// Path segments after the host, ignoring query strings and fragments
fn segments_after<'a>(url: &'a str, host: &str) -> Option<Vec<&'a str>> {
    let (_, rest) = url.split_once(host)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    Some(rest.split('/').filter(|s| !s.is_empty()).collect())
}

/// HuggingFace model id (`org/model` or `model`) from a model URL or bare id
pub fn parse_hf_model_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if !url.contains("://") && !url.contains(HF_HOST) {
        return Some(url.trim_matches('/').to_string()).filter(|id| !id.is_empty());
    }

    let segments = segments_after(url, HF_HOST)?;
    match segments.as_slice() {
        [] | ["datasets", ..] | ["spaces", ..] => None,
        [model] => Some(model.to_string()),
        [org, model, ..] if matches!(*model, "tree" | "blob" | "resolve") => Some(org.to_string()),
        [org, model, ..] => Some(format!("{}/{}", org, model)),
    }
}

/// HuggingFace dataset id from a `huggingface.co/datasets/...` URL
pub fn parse_hf_dataset_id(url: &str) -> Option<String> {
    let segments = segments_after(url.trim(), HF_HOST)?;

    match segments.as_slice() {
        ["datasets", name] => Some(name.to_string()),
        ["datasets", org, name, ..] if matches!(*name, "tree" | "blob" | "resolve") => {
            Some(org.to_string())
        }
        ["datasets", org, name, ..] => Some(format!("{}/{}", org, name)),
        _ => None,
    }
}

/// GitHub `(owner, repo)` from https, `.git` suffixed or SSH URLs
pub fn parse_github_repo(url: &str) -> Option<(String, String)> {
    let url = url.trim();

    let rest = if let Some(rest) = url.strip_prefix(GITHUB_SSH_PREFIX) {
        rest
    } else {
        url.split_once(GITHUB_HOST)?.1
    };

    let mut parts = rest.split(['?', '#']).next()?.split('/').filter(|s| !s.is_empty());
    let owner = parts.next()?;
    let repo = parts.next()?.trim_end_matches(".git");

    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}
