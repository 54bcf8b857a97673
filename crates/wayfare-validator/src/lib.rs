//! Wayfare Validator
//!
//! Checks a candidate itinerary payload against the required-field rules
//! before anything is persisted.
//!
//! Rules run in order and stop at the first violation:
//! 1. `pnr`, `airline`, `passengers`, `journeys` present and non-empty
//! 2. every passenger has a non-empty `name`
//! 3. every journey has a non-empty `segments` list
//! 4. every segment has non-empty `flight_number`, `departure`, `arrival`,
//!    `departure_time`, `arrival_time`
//!
//! Validation never coerces or fills in defaults.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use wayfare_validator::{validate, ValidationError};
//!
//! let err = validate(json!({"airline": "KLM"})).unwrap_err();
//! assert_eq!(err, ValidationError::MissingField("pnr"));
//! ```

#![warn(missing_docs)]

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{validate, SchemaValidator, ValidatedItinerary, REQUIRED_SEGMENT_FIELDS};
