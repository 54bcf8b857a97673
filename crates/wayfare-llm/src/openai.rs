//! OpenAI Provider Implementation
//!
//! Calls a chat-completions endpoint with bearer authentication.
//!
//! # Features
//!
//! - Async HTTP communication
//! - JSON-object response format
//! - Bounded request timeout, no retries
//!
//! # Examples
//!
//! ```no_run
//! use wayfare_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new(
//!     "https://api.openai.com/v1/chat/completions",
//!     "gpt-4.1-mini",
//!     "sk-...",
//! ).unwrap();
//! ```

use crate::LlmError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use wayfare_domain::{CompletionProvider, CompletionRequest};

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Chat-completions API provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response from the chat-completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider with the default timeout
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new provider with an explicit timeout in seconds
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout_secs,
            client,
        })
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat completion and return the first choice's content
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or times out
    /// - The API key is rejected
    /// - The response has no choice content
    pub async fn chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            response_format: request
                .json_object
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        tracing::debug!(model = %self.model, prompt_len = request.prompt.len(), "Sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.status_error(status, error_text));
        }

        let envelope = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_content(envelope)
    }

    fn transport_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Communication(format!("Request failed: {}", error))
        }
    }

    fn status_error(&self, status: StatusCode, body: String) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::Authentication(format!("HTTP {}", status))
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
            StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
            _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
        }
    }
}

fn extract_content(envelope: ChatCompletionResponse) -> Result<String, LlmError> {
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choice content".to_string()))
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CompletionProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.chat(request).await
    }
}
