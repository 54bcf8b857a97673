//! Wayfare Importer
//!
//! Orchestrates one manual import: fetch unseen airline emails, extract a
//! validated itinerary from each, upsert it into the trip store, then flag
//! the successfully imported messages seen in one batch.
//!
//! Failures are logged once, by the component that saw them: mailbox
//! failures by the mail client, extraction failures by the extractor, and
//! store failures here. Messages that fail stay unseen and are retried on
//! the next run.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use wayfare_domain::{MailboxConfig, MemoryEventLog};
//! use wayfare_extractor::{ExtractorConfig, ItineraryExtractor};
//! use wayfare_importer::{ImportSettings, Importer};
//! use wayfare_llm::MockProvider;
//! use wayfare_mail::{MailClient, MemoryConnector};
//! use wayfare_store::SqliteTripStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new(MemoryEventLog::new());
//! let mail = Arc::new(MailClient::new(MemoryConnector::new(), log.clone()));
//! let extractor = ItineraryExtractor::new(
//!     MockProvider::default(),
//!     ExtractorConfig::default().with_api_key("sk-test"),
//!     log.clone(),
//! );
//! let store = Arc::new(Mutex::new(SqliteTripStore::new(":memory:")?));
//!
//! let settings = ImportSettings::new(MailboxConfig::default());
//! let mut importer = Importer::new(settings, mail, extractor, store, log);
//! let report = importer.run().await;
//! println!("{}", report.notice());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod importer;
mod report;

pub use importer::{ImportSettings, Importer};
pub use report::{ImportOutcome, ImportReport, ImportStage, ImportSummary, ImportedTrip, MessageFailure};
