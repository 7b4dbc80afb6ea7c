use async_trait::async_trait;
use std::fmt::Debug;

use super::{Completion, CompletionRequest};
use crate::domain::DomainError;

/// A text-completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    async fn complete(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, DomainError>;

    fn provider_name(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock provider answering every request with the same text or error
    #[derive(Debug)]
    pub struct MockLlmProvider {
        name: String,
        text: Option<String>,
        error: Option<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmProvider {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                text: None,
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_text(mut self, text: impl Into<String>) -> Self {
            self.text = Some(text.into());
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn complete(
            &self,
            model: &str,
            request: &CompletionRequest,
        ) -> Result<Completion, DomainError> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(&self.name, error));
            }

            self.text
                .as_ref()
                .map(|text| Completion::new(model, text))
                .ok_or_else(|| DomainError::provider(&self.name, "No mock text configured"))
        }

        fn provider_name(&self) -> &str {
            &self.name
        }
    }
}
