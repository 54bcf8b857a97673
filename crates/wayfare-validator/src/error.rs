//! Validation error types

use thiserror::Error;

/// The first rule a payload violated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payload is not a JSON object
    #[error("Payload must be a JSON object")]
    NotAnObject,

    /// A top-level key is absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A top-level key has the wrong JSON type
    #[error("Field {field} must be {expected}")]
    InvalidType {
        /// Field name
        field: &'static str,
        /// Expected JSON shape
        expected: &'static str,
    },

    /// A passenger lacks a usable name
    #[error("Passenger {index} is missing a name")]
    PassengerName {
        /// Position in `passengers`
        index: usize,
    },

    /// A journey has no segments
    #[error("Journey {index} has no segments")]
    MissingSegments {
        /// Position in `journeys`
        index: usize,
    },

    /// A segment lacks a required field
    #[error("Journey {journey} segment {segment} is missing {field}")]
    SegmentField {
        /// Position in `journeys`
        journey: usize,
        /// Position in the journey's `segments`
        segment: usize,
        /// Missing field
        field: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotAnObject => "payload",
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidType { field, .. } => field,
            ValidationError::PassengerName { .. } => "passengers.name",
            ValidationError::MissingSegments { .. } => "journeys.segments",
            ValidationError::SegmentField { field, .. } => field,
        }
    }
}
