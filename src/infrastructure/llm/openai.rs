use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Completion, CompletionRequest, DomainError, LlmProvider};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "openai";

/// Client for any endpoint speaking the OpenAI chat completions protocol
///
/// Each request becomes one user message, preceded by a system message
/// when instructions are set.
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    endpoint: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let endpoint = format!(
            "{}/v1/chat/completions",
            base_url.into().trim_end_matches('/')
        );

        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            endpoint,
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn complete(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, DomainError> {
        let body = serde_json::to_value(ChatRequest::new(model, request)).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to encode request: {}", e))
        })?;

        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];
        let raw = self.client.post_json(&self.endpoint, headers, &body).await?;

        let response: ChatResponse = serde_json::from_value(raw).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Unexpected response body: {}", e))
        })?;
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(DomainError::provider(PROVIDER, "Response has no choices"));
        };

        debug!(model = %response.model, finish_reason = ?choice.finish_reason, "Completion received");

        let completion = Completion::new(response.model, choice.message.content.unwrap_or_default());
        Ok(match choice.finish_reason {
            Some(reason) => completion.with_finish_reason(reason),
            None => completion,
        })
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        let system = request.instructions.as_deref().map(|content| ChatMessage {
            role: "system",
            content,
        });
        let user = ChatMessage {
            role: "user",
            content: &request.prompt,
        };

        Self {
            model,
            messages: system.into_iter().chain([user]).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(text: &str, finish_reason: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": finish_reason
            }]
        })
    }

    #[tokio::test]
    async fn test_complete_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "max_tokens": 16,
                "messages": [
                    {"role": "system", "content": "Answer with a number"},
                    {"role": "user", "content": "## Usage\nimport x"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("0.6\nClear usage.", "stop")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::with_base_url(HttpClient::new(), "sk-test", server.uri());
        let request = CompletionRequest::new("## Usage\nimport x")
            .with_instructions("Answer with a number")
            .with_max_tokens(16);

        let completion = provider.complete("gpt-4o-mini", &request).await.unwrap();

        assert_eq!(completion.text(), Some("0.6\nClear usage."));
        assert_eq!(completion.model, "gpt-4o-mini");
        assert!(!completion.was_truncated());
    }

    #[test]
    fn test_request_without_instructions_has_one_message() {
        let request = CompletionRequest::new("README");
        let body = serde_json::to_value(ChatRequest::new("m", &request)).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_truncated_answer() {
        let client = MockHttpClient::new().with_response(
            "http://llm.test/v1/chat/completions",
            completion_body("0.", "length"),
        );
        let provider = OpenAiProvider::with_base_url(client, "key", "http://llm.test/");

        let completion = provider
            .complete("m", &CompletionRequest::new("README"))
            .await
            .unwrap();

        assert!(completion.was_truncated());
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = MockHttpClient::new()
            .with_error("https://api.openai.com/v1/chat/completions", "HTTP 401");
        let provider = OpenAiProvider::new(client, "bad-key");

        let result = provider.complete("m", &CompletionRequest::new("README")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let client = MockHttpClient::new().with_response(
            "https://api.openai.com/v1/chat/completions",
            json!({"model": "m", "choices": []}),
        );
        let provider = OpenAiProvider::new(client, "key");

        let result = provider.complete("m", &CompletionRequest::new("README")).await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
