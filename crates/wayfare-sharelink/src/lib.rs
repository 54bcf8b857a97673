//! Wayfare Share Link
//!
//! Fallback client for public itinerary-sharing pages. It fetches the page
//! with browser-like headers, optionally after a consent POST that seeds the
//! cookie jar, and returns the JSON state embedded in the markup.
//!
//! This is tied to a third party's current markup and sits outside the
//! import pipeline.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfare_domain::MemoryEventLog;
//! use wayfare_sharelink::{ShareLinkClient, ShareLinkConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ShareLinkClient::new(ShareLinkConfig::default(), Arc::new(MemoryEventLog::new()))?;
//! let payload = client.fetch_payload("https://www.tripit.com/trip/show/id/123").await?;
//! println!("{}", payload);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod extract;

pub use client::{
    ConsentConfig, ShareLinkClient, ShareLinkConfig, BROWSER_USER_AGENT, DEFAULT_TIMEOUT_SECS,
};
pub use error::ShareLinkError;
pub use extract::{extract_embedded_json, Marker};
