//! Parse LLM output into a JSON payload

use serde_json::Value;

use crate::error::ExtractorError;

/// Parse completion content as JSON
///
/// Markdown code fences around the JSON are tolerated. The result is not
/// validated here.
pub fn parse_completion(content: &str) -> Result<Value, ExtractorError> {
    let json_str = strip_code_fence(content);
    if json_str.is_empty() {
        return Err(ExtractorError::Format("Empty completion content".to_string()));
    }

    serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::Format(format!("JSON parse error: {}", e)))
}

/// Extract JSON from response, handling markdown code blocks
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Skip the opening fence line (``` or ```json) and the closing fence
    let inner = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => return "",
    };
    inner.trim_end().trim_end_matches("```").trim()
}

/// Single-line excerpt of a raw payload for log entries
///
/// Line breaks become spaces and the result is cut to `max_chars` characters.
pub fn payload_excerpt(payload: &str, max_chars: usize) -> String {
    payload
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .take(max_chars)
        .collect()
}
