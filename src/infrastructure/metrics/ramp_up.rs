use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::is_truthy;
use crate::domain::metric::round_to;
use crate::domain::{
    CompletionRequest, DomainError, LlmProvider, Metadata, Metric, MetricName, MetricValue,
    ModelArtifact,
};

/// Character budget for README text sent to the LLM
pub const README_CHAR_BUDGET: usize = 8000;

/// Upper bound of the metadata heuristic; the signals below sum to at most 0.75
pub const HEURISTIC_CAP: f64 = 0.85;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(#{2,3})\s+(.*)").unwrap());

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)").unwrap());

/// Sections kept from the README, with the heading keywords that select them
const SECTIONS: [(&str, &[&str]); 4] = [
    ("Installation", &["installation", "setup", "getting started"]),
    ("Usage", &["usage", "how to use", "examples"]),
    ("Dataset", &["dataset", "data", "inputs"]),
    ("Training", &["training", "train", "fine-tune", "finetune"]),
];

const RUBRIC: &str = "\
You are judging how quickly a new engineering team could understand and start using an AI \
model, using only the README excerpt above.\n\
Rate the model's ease of ramp-up from 0.0 (very hard to learn) to 1.0 (very easy to learn).\n\
Give up to 0.20 points for each of the following:\n\
- a clear, helpful README\n\
- clear installation instructions\n\
- usage examples\n\
- a description of the dataset\n\
- a training script\n\
Put only the score as a single float (for example 0.60) on the first line. Any explanation \
must come after the first line; only the first line is read.\n";

/// Model documentation quality
///
/// README sections are graded by the LLM collaborator when one is
/// configured; otherwise, or when the LLM gives no usable answer, the score
/// comes from metadata signals.
#[derive(Debug, Clone)]
pub struct RampUpMetric {
    llm: Option<Arc<dyn LlmProvider>>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl RampUpMetric {
    /// Heuristic-only metric
    pub fn heuristic() -> Self {
        Self {
            llm: None,
            model: String::new(),
            temperature: 0.0,
            max_tokens: 64,
        }
    }

    pub fn with_llm(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm: Some(llm),
            model: model.into(),
            ..Self::heuristic()
        }
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    async fn llm_score(&self, llm: &dyn LlmProvider, readme: &str) -> Option<f64> {
        let prompt = format!("{}\n\n{}", extract_relevant_sections(readme), RUBRIC);
        let request = CompletionRequest::new(prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let completion = match llm.complete(&self.model, &request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(provider = llm.provider_name(), error = %e, "LLM scoring failed");
                return None;
            }
        };

        if completion.was_truncated() {
            debug!(provider = llm.provider_name(), "LLM answer hit the token limit");
        }

        let score = completion.text().and_then(parse_score);
        if score.is_none() {
            warn!(
                provider = llm.provider_name(),
                "LLM response has no score on its first line"
            );
        }
        score
    }
}

#[async_trait]
impl Metric for RampUpMetric {
    fn name(&self) -> MetricName {
        MetricName::RampUpTime
    }

    async fn evaluate(&self, model: &ModelArtifact) -> Result<MetricValue, DomainError> {
        let hf = model.hf_metadata().await;

        let readme = hf.get_str("readme").filter(|r| !r.is_empty());
        let score = match (readme, self.llm.as_deref()) {
            (Some(readme), Some(llm)) => match self.llm_score(llm, readme).await {
                Some(score) => score,
                None => heuristic_score(hf),
            },
            _ => {
                debug!(model = model.name(), "Using metadata heuristic for ramp-up");
                heuristic_score(hf)
            }
        };

        Ok(MetricValue::Scalar(score))
    }
}

/// Installation, usage, dataset and training sections of a README, within the character budget
///
/// Only the first heading matching each section is kept. Without any
/// matching heading, the start of the README is used.
pub fn extract_relevant_sections(readme: &str) -> String {
    if readme.is_empty() {
        return String::new();
    }

    let headings: Vec<_> = HEADING.captures_iter(readme).collect();
    let mut found: Vec<(usize, String)> = Vec::new();

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let title = title.as_str().trim().to_lowercase();
        let end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(readme.len(), |m| m.start());
        let content = readme[whole.end()..end].trim();

        let matched = SECTIONS
            .iter()
            .position(|(_, keywords)| keywords.iter().any(|k| title.contains(k)));

        if let Some(index) = matched {
            if !found.iter().any(|(seen, _)| *seen == index) {
                found.push((index, format!("## {}\n{}", SECTIONS[index].0, content)));
            }
        }
    }

    let sections: Vec<String> = found.into_iter().map(|(_, section)| section).collect();
    if sections.is_empty() {
        return format!("{}\n...", truncate_chars(readme, README_CHAR_BUDGET));
    }

    let combined = sections.join("\n\n");
    if combined.chars().count() > README_CHAR_BUDGET {
        format!("{}\n...", truncate_chars(&combined, README_CHAR_BUDGET))
    } else {
        combined
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Score on the first non-empty line of an LLM response, clamped to [0, 1]
pub fn parse_score(response: &str) -> Option<f64> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;

    let score = line.parse::<f64>().ok().or_else(|| {
        LEADING_NUMBER
            .find(line)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })?;

    score.is_finite().then(|| score.clamp(0.0, 1.0))
}

/// Documentation signals available without an LLM, capped at [`HEURISTIC_CAP`]
pub fn heuristic_score(hf: &Metadata) -> f64 {
    let mut score = 0.0;

    if let Some(readme) = hf.get_str("readme") {
        score += match readme.chars().count() {
            n if n > 5000 => 0.20,
            n if n > 1000 => 0.15,
            n if n > 100 => 0.08,
            _ => 0.0,
        };
    }

    let card_widget = hf
        .get_object("cardData")
        .and_then(|card| card.get("widget"))
        .is_some_and(is_truthy);
    if hf.get("widgetData").is_some_and(is_truthy) || card_widget {
        score += 0.15;
    }

    if hf.get("pipeline_tag").is_some_and(is_truthy) {
        score += 0.12;
    }

    let downloads = hf.get_f64("downloads").unwrap_or(0.0);
    let likes = hf.get_f64("likes").unwrap_or(0.0);
    if downloads > 10_000.0 || likes > 50.0 {
        score += 0.20;
    } else if downloads > 1_000.0 || likes > 10.0 {
        score += 0.12;
    }

    if hf.tags().any(|tag| tag.contains("arxiv:")) {
        score += 0.08;
    }

    round_to(f64::min(HEURISTIC_CAP, score), 2)
}
