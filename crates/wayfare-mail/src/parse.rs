//! Message parsing
//!
//! Turns raw RFC 5322 bytes into a [`MailboxMessage`] and builds the short
//! plain-text snippets used by inbox previews.

use lazy_static::lazy_static;
use mailparse::{MailHeaderMap, ParsedMail};
use regex::Regex;
use tracing::warn;
use wayfare_domain::{MailboxMessage, MessagePreview};

/// Maximum snippet length in characters
pub const SNIPPET_LENGTH: usize = 140;

lazy_static! {
    static ref RX_SCRIPT_STYLE: Regex =
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap();
    static ref RX_BLOCK_BREAK: Regex =
        Regex::new(r"(?i)<\s*(br|/p|/div|/tr|/li|/h[1-6])\b[^>]*>").unwrap();
    static ref RX_TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref RX_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RX_NUMERIC_ENTITY: Regex = Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap();
}

/// Parse a raw message
///
/// Never fails: a message mailparse cannot read is kept with empty headers
/// and its bytes decoded lossily as the body.
pub fn parse_message(uid: u32, raw: &[u8]) -> MailboxMessage {
    let parsed = match mailparse::parse_mail(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(uid, error = %e, "Unparseable message, using raw bytes");
            return MailboxMessage {
                uid,
                message_id: String::new(),
                subject: String::new(),
                from: String::new(),
                date: String::new(),
                body: String::from_utf8_lossy(raw).into_owned(),
            };
        }
    };

    let header = |name: &str| {
        parsed
            .headers
            .get_first_value(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    MailboxMessage {
        uid,
        message_id: header("Message-ID"),
        subject: header("Subject"),
        from: header("From"),
        date: header("Date"),
        body: select_body(&parsed),
    }
}

/// Preview of a parsed message
pub fn preview(message: &MailboxMessage) -> MessagePreview {
    MessagePreview {
        uid: message.uid,
        message_id: message.message_id.clone(),
        subject: message.subject.clone(),
        from: message.from.clone(),
        date: message.date.clone(),
        snippet: snippet(&message.body, SNIPPET_LENGTH),
    }
}

/// Pick the body text
///
/// First `text/plain` part, else first `text/html` part as text, else the
/// decoded root body.
fn select_body(parsed: &ParsedMail<'_>) -> String {
    if let Some(text) = find_part(parsed, "text/plain") {
        return text;
    }
    if let Some(html) = find_part(parsed, "text/html") {
        return html_to_text(&html);
    }
    parsed.get_body().unwrap_or_default()
}

fn find_part(part: &ParsedMail<'_>, mimetype: &str) -> Option<String> {
    if part.subparts.is_empty() {
        if part.ctype.mimetype.eq_ignore_ascii_case(mimetype) && !is_attachment(part) {
            return part.get_body().ok();
        }
        return None;
    }
    part.subparts.iter().find_map(|sub| find_part(sub, mimetype))
}

fn is_attachment(part: &ParsedMail<'_>) -> bool {
    part.headers
        .get_first_value("Content-Disposition")
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("attachment"))
        .unwrap_or(false)
}

/// Convert HTML to plain text, keeping line breaks at block boundaries
pub fn html_to_text(html: &str) -> String {
    let without_scripts = RX_SCRIPT_STYLE.replace_all(html, " ");
    let with_breaks = RX_BLOCK_BREAK.replace_all(&without_scripts, "\n");
    let without_tags = RX_TAG.replace_all(&with_breaks, " ");
    decode_entities(&without_tags)
}

/// Decode the handful of entities that show up in airline mail
pub fn decode_entities(text: &str) -> String {
    let numeric = RX_NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures<'_>| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Whitespace-collapsed, HTML-stripped excerpt capped at `max_chars`
///
/// A trailing `…` marks truncation.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let plain = if text.contains('<') {
        html_to_text(text)
    } else {
        text.to_string()
    };
    let collapsed = RX_WHITESPACE.replace_all(plain.trim(), " ");

    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }

    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
