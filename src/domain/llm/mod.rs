//! LLM collaborator - single-turn completions used for text grading

mod completion;
mod provider;

pub use completion::{Completion, CompletionRequest};
pub use provider::LlmProvider;

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
