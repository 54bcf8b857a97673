//! Core Extractor implementation

use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};
use wayfare_domain::{CompletionProvider, ContextHints, EventLog, LogContext, NewLogEntry};
use wayfare_llm::LlmError;
use wayfare_validator::{validate, ValidatedItinerary};

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_completion, payload_excerpt};
use crate::prompt::PromptBuilder;

/// Converts email bodies into validated itineraries
pub struct ItineraryExtractor<P> {
    provider: P,
    config: ExtractorConfig,
    log: Arc<dyn EventLog>,
}

impl<P> ItineraryExtractor<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    /// Create a new extractor
    pub fn new(provider: P, config: ExtractorConfig, log: Arc<dyn EventLog>) -> Self {
        Self {
            provider,
            config,
            log,
        }
    }

    /// Borrow the provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Check that the settings needed for a call are present
    pub fn check_configuration(&self) -> Result<(), ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)
    }

    /// Extract a validated itinerary from an email body
    ///
    /// Any failure is recorded in the event log before it is returned.
    pub async fn extract(
        &self,
        body: &str,
        hints: &ContextHints,
    ) -> Result<ValidatedItinerary, ExtractorError> {
        self.run(body).await.map_err(|failure| {
            let message = match &failure {
                Failure::Rejected { error, content } => format!(
                    "Validation failed: {} | Payload: {}",
                    error,
                    payload_excerpt(content, self.config.excerpt_len)
                ),
                Failure::Other(error) => error.to_string(),
            };
            self.log.record(
                NewLogEntry::error(LogContext::Extraction, message)
                    .with_message_id(hints.message_id.as_deref()),
            );
            failure.into_error()
        })
    }

    async fn run(&self, body: &str) -> Result<ValidatedItinerary, Failure> {
        self.check_configuration()?;

        let request = PromptBuilder::new(body).request();
        debug!("Prompt length: {} chars", request.prompt.len());

        let content = timeout(self.config.timeout(), self.provider.complete(&request))
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.timeout_secs))?
            .map_err(ExtractorError::from)?;

        debug!("Completion length: {} chars", content.len());

        let payload = parse_completion(&content)?;

        match validate(payload) {
            Ok(itinerary) => {
                info!(pnr = itinerary.pnr(), "Extracted itinerary");
                Ok(itinerary)
            }
            Err(error) => Err(Failure::Rejected { error, content }),
        }
    }
}

/// A failure plus what the log entry needs to describe it
enum Failure {
    Rejected {
        error: wayfare_validator::ValidationError,
        content: String,
    },
    Other(ExtractorError),
}

impl Failure {
    fn into_error(self) -> ExtractorError {
        match self {
            Failure::Rejected { error, .. } => ExtractorError::Validation(error),
            Failure::Other(error) => error,
        }
    }
}

impl From<ExtractorError> for Failure {
    fn from(error: ExtractorError) -> Self {
        Failure::Other(error)
    }
}
