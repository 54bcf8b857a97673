//! Wayfare LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `wayfare-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: Chat-completions API over HTTPS
//!
//! # Examples
//!
//! ```
//! use wayfare_domain::{CompletionProvider, CompletionRequest};
//! use wayfare_llm::MockProvider;
//!
//! let provider = MockProvider::new(r#"{"pnr":"ABC123"}"#);
//! let request = CompletionRequest {
//!     system: "Respond with JSON".to_string(),
//!     prompt: "Parse this".to_string(),
//!     json_object: true,
//! };
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(provider.complete(&request)).unwrap();
//! assert_eq!(result, r#"{"pnr":"ABC123"}"#);
//! ```

#![warn(missing_docs)]

pub mod openai;

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use wayfare_domain::{CompletionProvider, CompletionRequest};

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The endpoint rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request did not finish in time
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Response envelope did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether the failure happened before a usable response arrived
    pub fn is_transport(&self) -> bool {
        !matches!(self, LlmError::InvalidResponse(_))
    }
}

/// What a matched mock rule does
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Reply(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. A rule
/// matches when the prompt contains its needle; rules are checked in the order
/// they were added and the default response is used when none match.
///
/// # Examples
///
/// ```
/// use wayfare_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("Booking ABC123", r#"{"pnr":"ABC123"}"#);
/// provider.add_error("Booking BROKEN");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, Rule)>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `response` when the prompt contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((needle.into(), Rule::Reply(response.into())));
    }

    /// Fail with a communication error when the prompt contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        lock(&self.rules).push((needle.into(), Rule::Fail));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }

    fn respond(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        lock(&self.requests).push(request.clone());

        let rules = lock(&self.rules);
        let matched = rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, rule)| rule);

        match matched {
            Some(Rule::Fail) => Err(LlmError::Communication("Mock error".to_string())),
            Some(Rule::Reply(response)) => Ok(response.clone()),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.respond(request)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            prompt: prompt.to_string(),
            json_object: true,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_matches_substring() {
        let mut provider = MockProvider::default();
        provider.add_response("Booking ABC", "first");
        provider.add_response("Booking", "second");

        assert_eq!(provider.complete(&request("... Booking ABC ...")).await.unwrap(), "first");
        assert_eq!(provider.complete(&request("Booking XYZ")).await.unwrap(), "second");
        assert_eq!(provider.complete(&request("unrelated")).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("prompt1")).await.unwrap();
        provider.complete(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].prompt, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete(&request("a bad prompt")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Communication(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_replies_literal_error_text() {
        let mut provider = MockProvider::default();
        provider.add_response("status", "ERROR");

        let result = provider.complete(&request("status please")).await;
        assert_eq!(result.unwrap(), "ERROR");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_error_classification() {
        assert!(LlmError::Timeout(30).is_transport());
        assert!(LlmError::Authentication("bad key".to_string()).is_transport());
        assert!(!LlmError::InvalidResponse("no choices".to_string()).is_transport());
    }
}
