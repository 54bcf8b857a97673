//! Embedded-JSON discovery
//!
//! Share pages carry their itinerary state in one of a few places. Markers
//! are tried in a fixed order and the first capture that parses as a JSON
//! object or array wins.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;
use wayfare_mail::parse::decode_entities;

use crate::ShareLinkError;

lazy_static! {
    static ref RX_NEXT_DATA: Regex =
        Regex::new(r#"(?s)<script[^>]+id="__NEXT_DATA__"[^>]*>(.*?)</script>"#).unwrap();
    static ref RX_PRELOADED_STATE: Regex =
        Regex::new(r"(?s)window\.__PRELOADED_STATE__\s*=\s*(\{.+?\})\s*;?").unwrap();
    static ref RX_TRIP_JSON: Regex = Regex::new(r"(?s)var\s+tripJSON\s*=\s*(\{.+?\});").unwrap();
    static ref RX_DATA_STATE: Regex =
        Regex::new(r#"(?s)data-state=(?:"(.*?)"|'(.*?)')"#).unwrap();
}

/// Where a payload was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `<script id="__NEXT_DATA__">`
    NextData,
    /// `window.__PRELOADED_STATE__ = {...}`
    PreloadedState,
    /// `var tripJSON = {...};`
    TripJson,
    /// `data-state="..."`, entity-encoded
    DataState,
}

impl Marker {
    /// All markers in lookup order
    pub const ALL: [Marker; 4] = [
        Marker::NextData,
        Marker::PreloadedState,
        Marker::TripJson,
        Marker::DataState,
    ];

    fn capture(&self, html: &str) -> Option<String> {
        match self {
            Marker::NextData => first_group(&RX_NEXT_DATA, html),
            Marker::PreloadedState => first_group(&RX_PRELOADED_STATE, html),
            Marker::TripJson => first_group(&RX_TRIP_JSON, html),
            Marker::DataState => RX_DATA_STATE.captures(html).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| decode_entities(m.as_str()))
            }),
        }
    }
}

fn first_group(regex: &Regex, html: &str) -> Option<String> {
    regex
        .captures(html)
        .and_then(|caps: Captures<'_>| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the embedded JSON payload in a share page
///
/// A marker that matches but does not hold an object or array falls
/// through to the next one.
pub fn extract_embedded_json(html: &str) -> Result<(Marker, Value), ShareLinkError> {
    for marker in Marker::ALL {
        let Some(candidate) = marker.capture(html) else {
            continue;
        };
        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(value) if value.is_object() || value.is_array() => return Ok((marker, value)),
            _ => tracing::debug!(marker = ?marker, "Marker matched without a JSON payload"),
        }
    }
    Err(ShareLinkError::PayloadNotFound)
}
