//! Share-page client errors

use thiserror::Error;

/// Errors raised while fetching a share page
#[derive(Error, Debug)]
pub enum ShareLinkError {
    /// The link is not an absolute http(s) URL
    #[error("Invalid share link: {0}")]
    InvalidUrl(String),

    /// Transport failure
    #[error("Share page request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Share page returned HTTP {0}")]
    Status(u16),

    /// The page came back empty
    #[error("Share page response was empty")]
    EmptyBody,

    /// None of the known markers held a JSON payload
    #[error("Unable to locate an embedded JSON payload")]
    PayloadNotFound,
}
