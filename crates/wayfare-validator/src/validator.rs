//! Itinerary payload validation

use serde_json::{Map, Value};

use crate::ValidationError;

const REQUIRED_TOP_LEVEL: [&str; 4] = ["pnr", "airline", "passengers", "journeys"];

/// Fields every segment must carry, in check order
pub const REQUIRED_SEGMENT_FIELDS: [&str; 5] = [
    "flight_number",
    "departure",
    "arrival",
    "departure_time",
    "arrival_time",
];

/// A payload that passed every rule
///
/// Holds the payload exactly as received. Only [`validate`] constructs one,
/// so holding a `ValidatedItinerary` means the rules were checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedItinerary {
    raw: Value,
}

impl ValidatedItinerary {
    /// Booking reference
    pub fn pnr(&self) -> &str {
        self.raw.get("pnr").and_then(Value::as_str).unwrap_or_default()
    }

    /// Airline name
    pub fn airline(&self) -> &str {
        self.raw.get("airline").and_then(Value::as_str).unwrap_or_default()
    }

    /// Borrow the payload
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Take the payload back, unchanged
    pub fn into_value(self) -> Value {
        self.raw
    }
}

/// Stateless schema validator
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Create a validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a payload, see [`validate`]
    pub fn validate(&self, payload: Value) -> Result<ValidatedItinerary, ValidationError> {
        validate(payload)
    }
}

/// Validate a candidate itinerary payload
///
/// Returns the payload unchanged on success, or the first violated rule.
pub fn validate(payload: Value) -> Result<ValidatedItinerary, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    // 1. Top-level presence
    for key in REQUIRED_TOP_LEVEL {
        if !is_present(object.get(key)) {
            return Err(ValidationError::MissingField(key));
        }
    }
    for key in ["pnr", "airline"] {
        require_string(object, key)?;
    }

    // 2. Passengers
    let passengers = require_list(object, "passengers")?;
    for (index, passenger) in passengers.iter().enumerate() {
        let named = passenger
            .get("name")
            .map(is_non_empty_string)
            .unwrap_or(false);
        if !named {
            return Err(ValidationError::PassengerName { index });
        }
    }

    // 3. Journeys and their segment lists
    let journeys = require_list(object, "journeys")?;
    let mut segment_lists = Vec::with_capacity(journeys.len());
    for (index, journey) in journeys.iter().enumerate() {
        match journey.get("segments").and_then(Value::as_array) {
            Some(segments) if !segments.is_empty() => segment_lists.push(segments),
            _ => return Err(ValidationError::MissingSegments { index }),
        }
    }

    // 4. Segment fields
    for (journey, segments) in segment_lists.iter().enumerate() {
        for (segment, value) in segments.iter().enumerate() {
            for field in REQUIRED_SEGMENT_FIELDS {
                let present = value.get(field).map(is_non_empty_string).unwrap_or(false);
                if !present {
                    return Err(ValidationError::SegmentField {
                        journey,
                        segment,
                        field,
                    });
                }
            }
        }
    }

    Ok(ValidatedItinerary { raw: payload })
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn is_non_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.is_empty())
}

fn require_string(object: &Map<String, Value>, field: &'static str) -> Result<(), ValidationError> {
    match object.get(field) {
        Some(value) if is_non_empty_string(value) => Ok(()),
        _ => Err(ValidationError::InvalidType {
            field,
            expected: "a non-empty string",
        }),
    }
}

fn require_list<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Vec<Value>, ValidationError> {
    object
        .get(field)
        .and_then(Value::as_array)
        .ok_or(ValidationError::InvalidType {
            field,
            expected: "a non-empty list",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "pnr": "ABC123",
            "airline": "KLM",
            "passengers": [{"name": "Jane Doe"}],
            "journeys": [{
                "segments": [{
                    "flight_number": "KL1290",
                    "departure": "BLL",
                    "arrival": "AMS",
                    "departure_time": "2025-03-01T06:00:00",
                    "arrival_time": "2025-03-01T07:30:00",
                    "aircraft": "Boeing 737",
                    "class": "Economy"
                }]
            }]
        })
    }

    #[test]
    fn test_valid_payload_returned_unchanged() {
        let payload = sample();
        let validated = validate(payload.clone()).unwrap();

        assert_eq!(validated.as_value(), &payload);
        assert_eq!(validated.pnr(), "ABC123");
        assert_eq!(validated.airline(), "KLM");
        assert_eq!(validated.into_value(), payload);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(validate(json!([1, 2])), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn test_each_missing_top_level_key_is_named() {
        for key in REQUIRED_TOP_LEVEL {
            let mut payload = sample();
            payload.as_object_mut().unwrap().remove(key);
            let err = validate(payload).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(key));
            assert_eq!(err.field(), key);
        }
    }

    #[test]
    fn test_empty_top_level_values_are_missing() {
        let mut payload = sample();
        payload["airline"] = json!("");
        assert_eq!(validate(payload).unwrap_err(), ValidationError::MissingField("airline"));

        let mut payload = sample();
        payload["passengers"] = json!([]);
        assert_eq!(validate(payload).unwrap_err(), ValidationError::MissingField("passengers"));
    }

    #[test]
    fn test_checks_fail_fast_in_order() {
        let mut payload = sample();
        payload.as_object_mut().unwrap().remove("journeys");
        payload["passengers"] = json!([{"name": ""}]);

        // Top-level presence is checked before passenger names
        assert_eq!(validate(payload).unwrap_err(), ValidationError::MissingField("journeys"));
    }

    #[test]
    fn test_wrong_types_rejected() {
        let mut payload = sample();
        payload["pnr"] = json!(123456);
        assert!(matches!(
            validate(payload).unwrap_err(),
            ValidationError::InvalidType { field: "pnr", .. }
        ));

        let mut payload = sample();
        payload["journeys"] = json!({"segments": []});
        assert!(matches!(
            validate(payload).unwrap_err(),
            ValidationError::InvalidType { field: "journeys", .. }
        ));
    }

    #[test]
    fn test_empty_passenger_name() {
        let mut payload = sample();
        payload["passengers"] = json!([{"name": "Jane Doe"}, {"name": ""}]);
        assert_eq!(
            validate(payload).unwrap_err(),
            ValidationError::PassengerName { index: 1 }
        );

        let mut payload = sample();
        payload["passengers"] = json!([{}]);
        assert_eq!(
            validate(payload).unwrap_err(),
            ValidationError::PassengerName { index: 0 }
        );
    }

    #[test]
    fn test_journey_without_segments() {
        let mut payload = sample();
        payload["journeys"].as_array_mut().unwrap().push(json!({"segments": []}));
        assert_eq!(
            validate(payload).unwrap_err(),
            ValidationError::MissingSegments { index: 1 }
        );
    }

    #[test]
    fn test_segment_field_missing() {
        for field in REQUIRED_SEGMENT_FIELDS {
            let mut payload = sample();
            payload["journeys"][0]["segments"][0][field] = json!("");
            assert_eq!(
                validate(payload).unwrap_err(),
                ValidationError::SegmentField { journey: 0, segment: 0, field }
            );
        }
    }

    #[test]
    fn test_optional_segment_fields_not_required() {
        let mut payload = sample();
        let segment = payload["journeys"][0]["segments"][0].as_object_mut().unwrap();
        segment.remove("aircraft");
        segment.remove("class");
        assert!(validate(payload).is_ok());
    }

    #[test]
    fn test_validator_struct_delegates() {
        assert!(SchemaValidator::new().validate(sample()).is_ok());
    }

    proptest! {
        #[test]
        fn prop_well_formed_payloads_pass_unchanged(
            pnr in "[A-Z0-9]{6}",
            names in prop::collection::vec("[A-Za-z ]{1,20}", 1..4),
            journeys in 1usize..3,
            segments in 1usize..4,
        ) {
            let segment = json!({
                "flight_number": "KL1290",
                "departure": "BLL",
                "arrival": "AMS",
                "departure_time": "2025-03-01T06:00:00",
                "arrival_time": "2025-03-01T07:30:00"
            });
            let payload = json!({
                "pnr": pnr,
                "airline": "KLM",
                "passengers": names.iter().map(|n| json!({"name": n})).collect::<Vec<_>>(),
                "journeys": (0..journeys)
                    .map(|_| json!({"segments": vec![segment.clone(); segments]}))
                    .collect::<Vec<_>>(),
            });

            let validated = validate(payload.clone()).unwrap();
            prop_assert_eq!(validated.into_value(), payload);
        }
    }
}
