//! Wayfare Extractor
//!
//! Turns the body of an airline email into a validated itinerary using an
//! LLM completion call.
//!
//! # Architecture
//!
//! ```text
//! Email body → PromptBuilder → CompletionProvider → parser → validator
//! ```
//!
//! Every failure is written to the event log once, with context
//! `extraction` and the message id when known, and then returned to the
//! caller. The extractor never retries.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfare_domain::{ContextHints, MemoryEventLog};
//! use wayfare_extractor::{ExtractorConfig, ItineraryExtractor};
//! use wayfare_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"{"pnr": "ABC123"}"#);
//! let config = ExtractorConfig::default().with_api_key("sk-test");
//! let extractor = ItineraryExtractor::new(provider, config, Arc::new(MemoryEventLog::new()));
//!
//! let itinerary = extractor
//!     .extract("Booking reference ABC123 ...", &ContextHints::default())
//!     .await?;
//! println!("Extracted {}", itinerary.pnr());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::ItineraryExtractor;
pub use parser::{payload_excerpt, parse_completion};
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
