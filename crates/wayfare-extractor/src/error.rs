//! Error types for the Extractor

use thiserror::Error;
use wayfare_llm::LlmError;
use wayfare_validator::ValidationError;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Required settings missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction endpoint unreachable or rejected the request
    #[error("Extraction request failed: {0}")]
    Connection(LlmError),

    /// No response within the configured time
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// Response envelope or content was not usable JSON
    #[error("Invalid extraction response: {0}")]
    Format(String),

    /// Parsed JSON failed schema validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::InvalidResponse(reason) => ExtractorError::Format(reason),
            LlmError::Timeout(secs) => ExtractorError::Timeout(secs),
            other => ExtractorError::Connection(other),
        }
    }
}

impl ExtractorError {
    /// Whether the endpoint could not be reached in time
    pub fn is_connection(&self) -> bool {
        matches!(self, ExtractorError::Connection(_) | ExtractorError::Timeout(_))
    }
}
