//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! infrastructure. Implementations live in other crates.

use serde_json::Value;
use std::future::Future;

use crate::log::NewLogEntry;
use crate::trip::{ManualFields, PostId, Trip, TripSummary, TripUpsert};
use crate::FlatFields;

/// Trait for persisting trips
///
/// Implemented by the infrastructure layer (wayfare-store)
pub trait TripStore {
    /// Error type for store operations
    type Error;

    /// Insert or update the trip keyed by `upsert.pnr`
    ///
    /// Replaces the extracted-field mirror and merges manual fields.
    fn upsert_trip(&mut self, upsert: TripUpsert) -> Result<PostId, Self::Error>;

    /// Replace a trip's manual fields wholesale
    fn replace_manual_fields(
        &mut self,
        post_id: PostId,
        fields: ManualFields,
    ) -> Result<(), Self::Error>;

    /// Replace a trip's data after re-validating it; manual fields are untouched
    fn update_trip_data(&mut self, pnr: &str, trip_data: Value) -> Result<(), Self::Error>;

    /// Get a trip by booking reference
    fn get_by_pnr(&self, pnr: &str) -> Result<Option<Trip>, Self::Error>;

    /// Get the most recently imported trip
    fn get_latest(&self) -> Result<Option<Trip>, Self::Error>;

    /// List recently imported trips, newest first
    fn get_recent(&self, limit: usize) -> Result<Vec<TripSummary>, Self::Error>;

    /// Get a trip's manual fields
    fn manual_fields(&self, post_id: PostId) -> Result<ManualFields, Self::Error>;

    /// Get a trip's flattened extracted-field mirror, keyed by meta key
    fn extracted_fields(&self, post_id: PostId) -> Result<FlatFields, Self::Error>;
}

/// Trait for the append-only event log
///
/// Writes are best-effort: a sink that cannot persist an entry reports it
/// through tracing instead of failing the caller.
pub trait EventLog: Send + Sync {
    /// Append an entry
    fn record(&self, entry: NewLogEntry);
}

/// A single chat-completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Ask the endpoint to constrain output to a JSON object
    pub json_object: bool,
}

/// Trait for LLM completion providers
///
/// Implemented by the infrastructure layer (wayfare-llm)
pub trait CompletionProvider: Send + Sync {
    /// Error type for provider operations
    type Error;

    /// Run one completion and return the message content
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
