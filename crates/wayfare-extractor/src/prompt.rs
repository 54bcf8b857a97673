//! Prompt construction for itinerary extraction

use serde_json::json;
use wayfare_domain::CompletionRequest;

/// System instruction sent with every extraction
pub const SYSTEM_PROMPT: &str =
    "You are a flight itinerary parser. Respond with strict JSON that matches the provided schema.";

const RULES: &str = "Extract the itinerary from the following airline email.\n\
Rules:\n\
- Always return valid JSON only.\n\
- `passengers` must be a non-empty array. Each passenger must include a `name` exactly as written in the email (e.g., the 'Passenger name' line). No empty objects.\n\
- All datetime values must be ISO8601 (e.g., 2025-12-27T06:00:00).\n\
- Include baggage or status details only if explicitly provided.\n";

/// Builds the extraction prompt around an email body
pub struct PromptBuilder {
    body: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Illustrative payload showing the expected shape
    pub fn sample() -> serde_json::Value {
        json!({
            "pnr": "ABC123",
            "airline": "KLM",
            "passengers": [{"name": "Jane Doe"}],
            "journeys": [{
                "segments": [{
                    "departure": "Billund Airport (BLL)",
                    "arrival": "Amsterdam Schiphol (AMS)",
                    "departure_time": "2025-12-27T06:00:00",
                    "arrival_time": "2025-12-27T07:15:00",
                    "flight_number": "KL1290",
                    "aircraft": "Boeing 737",
                    "class": "Economy"
                }]
            }]
        })
    }

    /// Build the user prompt
    ///
    /// The email body is appended verbatim after the rules and sample.
    pub fn build(&self) -> String {
        let sample = serde_json::to_string_pretty(&Self::sample()).unwrap_or_default();

        let mut prompt = String::with_capacity(RULES.len() + sample.len() + self.body.len() + 96);
        prompt.push_str(RULES);
        prompt.push_str("Use this JSON as your structural guide (values are illustrative):\n");
        prompt.push_str(&sample);
        prompt.push_str("\nEmail:\n");
        prompt.push_str(&self.body);
        prompt
    }

    /// Build the full completion request, constrained to a JSON object
    pub fn request(&self) -> CompletionRequest {
        CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.build(),
            json_object: true,
        }
    }
}
