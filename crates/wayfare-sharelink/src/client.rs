//! Share-page HTTP client

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wayfare_domain::{EventLog, LogContext, NewLogEntry};

use crate::extract::extract_embedded_json;
use crate::ShareLinkError;

/// Browser user agent sent with page requests
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default page request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_REDIRECTS: usize = 5;

/// Consent handshake performed before the page request
#[derive(Debug, Clone)]
pub struct ConsentConfig {
    /// Endpoint accepting the consent POST
    pub endpoint: String,
    /// JSON body of the POST
    pub body: Value,
    /// Cookie set locally after the POST, in `Set-Cookie` syntax
    pub cookie: String,
    /// URL the local cookie is scoped to
    pub cookie_url: String,
    /// POST timeout
    pub timeout_secs: u64,
}

impl ConsentConfig {
    /// Consent notice used by the TripIt share pages
    pub fn tripit() -> Self {
        Self {
            endpoint: "https://consent.trustarc.com/v2/notice/accept".to_string(),
            body: json!({
                "publisher": "tripit.com",
                "noticeId": "aWwfbXl2",
                "siteId": "tripit.com",
                "consentType": "accept",
                "country": "DK",
                "language": "da",
                "cookieVersion": "1.0.0",
            }),
            cookie: "notice_welcome=true; Domain=.tripit.com".to_string(),
            cookie_url: "https://www.tripit.com/".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Share-page client settings
#[derive(Debug, Clone)]
pub struct ShareLinkConfig {
    /// Page request timeout in seconds
    pub timeout_secs: u64,
    /// Consent handshake; `None` skips it
    pub consent: Option<ConsentConfig>,
}

impl Default for ShareLinkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            consent: Some(ConsentConfig::tripit()),
        }
    }
}

impl ShareLinkConfig {
    /// Settings without a consent handshake
    pub fn without_consent() -> Self {
        Self {
            consent: None,
            ..Self::default()
        }
    }
}

/// Fetches share pages and pulls out their embedded JSON
pub struct ShareLinkClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    config: ShareLinkConfig,
    log: Arc<dyn EventLog>,
}

impl ShareLinkClient {
    /// Create a client that reports failures to `log`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: ShareLinkConfig, log: Arc<dyn EventLog>) -> Result<Self, ShareLinkError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            jar,
            config,
            log,
        })
    }

    /// Fetch `url` and return the first embedded JSON payload
    ///
    /// Failures are recorded in the event log before they are returned.
    pub async fn fetch_payload(&self, url: &str) -> Result<Value, ShareLinkError> {
        match self.fetch(url).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.log.record(NewLogEntry::error(
                    LogContext::ShareLink,
                    format!("Share link fetch failed: {}", e),
                ));
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, ShareLinkError> {
        let page = parse_url(url)?;

        if let Some(consent) = &self.config.consent {
            self.accept_consent(consent).await;
        }

        let response = self
            .http
            .get(page)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .header(REFERER, "https://www.google.com/")
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareLinkError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ShareLinkError::EmptyBody);
        }

        let (marker, value) = extract_embedded_json(&body)?;
        info!(marker = ?marker, "Share page payload found");
        Ok(value)
    }

    /// Best-effort: a failed POST still leaves the local cookie in place
    async fn accept_consent(&self, consent: &ConsentConfig) {
        let result = self
            .http
            .post(&consent.endpoint)
            .header(USER_AGENT, "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .header(CONTENT_TYPE, "application/json")
            .timeout(Duration::from_secs(consent.timeout_secs))
            .json(&consent.body)
            .send()
            .await;

        match result {
            Ok(response) => debug!(status = %response.status(), "Consent accepted"),
            Err(e) => warn!(error = %e, "Consent request failed"),
        }

        match Url::parse(&consent.cookie_url) {
            Ok(url) => self.jar.add_cookie_str(&consent.cookie, &url),
            Err(e) => warn!(error = %e, "Invalid consent cookie URL"),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, ShareLinkError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ShareLinkError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ShareLinkError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}
