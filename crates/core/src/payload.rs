//! Decoding of inbound telemetry records.
//!
//! Sensor devices publish a flat JSON object:
//!
//! ```json
//! {"heartRate": 72, "spo2": 98, "temperatureC": 36.5, "steps": 120}
//! ```
//!
//! Numeric fields may arrive as JSON numbers or as numeric strings. The
//! MQTT path decodes leniently (absent fields become `0` and are then caught
//! by validation); the direct-write path decodes strictly and reports every
//! missing required field.

use serde_json::{Map, Value};

pub const FIELD_HEART_RATE: &str = "heartRate";
pub const FIELD_SPO2: &str = "spo2";
pub const FIELD_TEMPERATURE_C: &str = "temperatureC";
pub const FIELD_STEPS: &str = "steps";

/// A decoded, type-coerced reading that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingInput {
    pub heart_rate: f64,
    pub spo2: f64,
    pub temperature_c: f64,
    pub steps: i64,
}

/// How absent fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Absent numeric fields default to `0`.
    Lenient,
    /// `heartRate`, `spo2` and `temperatureC` must be present and non-null.
    Strict,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload is not valid JSON: {0}")]
    Json(String),

    #[error("Payload must be a JSON object")]
    NotAnObject,

    #[error("Field '{field}' is not a valid {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Decode a raw message payload (UTF-8 JSON bytes) leniently.
pub fn decode_message(bytes: &[u8]) -> Result<ReadingInput, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
    decode_value(&value, DecodeMode::Lenient)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: &Value, mode: DecodeMode) -> Result<ReadingInput, DecodeError> {
    let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;

    if mode == DecodeMode::Strict {
        let missing: Vec<&'static str> = [FIELD_HEART_RATE, FIELD_SPO2, FIELD_TEMPERATURE_C]
            .into_iter()
            .filter(|field| obj.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(DecodeError::MissingFields(missing));
        }
    }

    let steps = match (mode, obj.get(FIELD_STEPS)) {
        (_, None) | (DecodeMode::Strict, Some(Value::Null)) => 0,
        (_, Some(v)) => coerce_i64(FIELD_STEPS, v)?,
    };

    Ok(ReadingInput {
        heart_rate: float_field(obj, FIELD_HEART_RATE)?,
        spo2: float_field(obj, FIELD_SPO2)?,
        temperature_c: float_field(obj, FIELD_TEMPERATURE_C)?,
        steps,
    })
}

fn float_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, DecodeError> {
    match obj.get(field) {
        None => Ok(0.0),
        Some(v) => coerce_f64(field, v),
    }
}

/// Coerce a JSON number or numeric string to a finite `f64`.
pub fn coerce_f64(field: &'static str, value: &Value) -> Result<f64, DecodeError> {
    let invalid = DecodeError::InvalidField {
        field,
        expected: "number",
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(invalid),
    }
}

/// Coerce a JSON number or numeric string to an `i64`.
///
/// Fractional numbers are truncated toward zero; numeric strings must hold
/// an integer literal.
pub fn coerce_i64(field: &'static str, value: &Value) -> Result<i64, DecodeError> {
    let invalid = DecodeError::InvalidField {
        field,
        expected: "integer",
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f.trunc() as i64)
                }
                _ => Err(invalid),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_complete_message() {
        let input =
            decode_message(br#"{"heartRate":72,"spo2":98,"temperatureC":36.5,"steps":120}"#)
                .unwrap();
        assert_eq!(
            input,
            ReadingInput {
                heart_rate: 72.0,
                spo2: 98.0,
                temperature_c: 36.5,
                steps: 120,
            }
        );
    }

    #[test]
    fn missing_steps_defaults_to_zero() {
        let input = decode_message(br#"{"heartRate":72,"spo2":98,"temperatureC":36.5}"#).unwrap();
        assert_eq!(input.steps, 0);
    }

    #[test]
    fn lenient_mode_defaults_missing_numbers_to_zero() {
        let input = decode_message(br#"{"spo2":98}"#).unwrap();
        assert_eq!(input.heart_rate, 0.0);
        assert_eq!(input.temperature_c, 0.0);
        assert_eq!(input.spo2, 98.0);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let input = decode_message(
            br#"{"heartRate":"72","spo2":" 98.5 ","temperatureC":"36.6","steps":"15"}"#,
        )
        .unwrap();
        assert_eq!(input.heart_rate, 72.0);
        assert_eq!(input.spo2, 98.5);
        assert_eq!(input.steps, 15);
    }

    #[test]
    fn non_numeric_heart_rate_is_rejected() {
        let err = decode_message(br#"{"heartRate":"fast","spo2":98,"temperatureC":36.5}"#)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                field: FIELD_HEART_RATE,
                expected: "number",
            }
        );
    }

    #[test]
    fn booleans_and_nulls_are_not_numbers() {
        assert_matches!(
            decode_message(br#"{"heartRate":true,"spo2":98}"#),
            Err(DecodeError::InvalidField { field: "heartRate", .. })
        );
        assert_matches!(
            decode_message(br#"{"heartRate":72,"spo2":null}"#),
            Err(DecodeError::InvalidField { field: "spo2", .. })
        );
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        assert_matches!(
            decode_message(br#"{"heartRate":"NaN","spo2":98}"#),
            Err(DecodeError::InvalidField { .. })
        );
        assert_matches!(
            decode_message(br#"{"heartRate":72,"spo2":"inf"}"#),
            Err(DecodeError::InvalidField { .. })
        );
    }

    #[test]
    fn fractional_steps_are_truncated() {
        let input = decode_message(br#"{"heartRate":72,"spo2":98,"steps":120.9}"#).unwrap();
        assert_eq!(input.steps, 120);
    }

    #[test]
    fn fractional_step_strings_are_rejected() {
        assert_matches!(
            decode_message(br#"{"heartRate":72,"spo2":98,"steps":"12.5"}"#),
            Err(DecodeError::InvalidField { field: "steps", expected: "integer" })
        );
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert_matches!(decode_message(b"not json"), Err(DecodeError::Json(_)));
        assert_matches!(decode_message(&[0xff, 0xfe]), Err(DecodeError::Json(_)));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(decode_message(b"[72, 98]"), Err(DecodeError::NotAnObject));
        assert_eq!(decode_message(b"72"), Err(DecodeError::NotAnObject));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let input =
            decode_message(br#"{"heartRate":72,"spo2":98,"temperatureC":36.5,"battery":80}"#)
                .unwrap();
        assert_eq!(input.heart_rate, 72.0);
    }

    #[test]
    fn strict_mode_lists_every_missing_field() {
        let err = decode_value(&json!({"steps": 3}), DecodeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingFields(vec![FIELD_HEART_RATE, FIELD_SPO2, FIELD_TEMPERATURE_C])
        );
        assert_eq!(
            err.to_string(),
            "Missing required field(s): heartRate, spo2, temperatureC"
        );
    }

    #[test]
    fn strict_mode_treats_null_as_missing() {
        let err = decode_value(
            &json!({"heartRate": null, "spo2": 98, "temperatureC": 36.5}),
            DecodeMode::Strict,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::MissingFields(vec![FIELD_HEART_RATE]));
    }

    #[test]
    fn strict_mode_allows_absent_or_null_steps() {
        let input = decode_value(
            &json!({"heartRate": 72, "spo2": 98, "temperatureC": 36.5, "steps": null}),
            DecodeMode::Strict,
        )
        .unwrap();
        assert_eq!(input.steps, 0);
    }

    #[test]
    fn strict_mode_does_not_range_check() {
        let input = decode_value(
            &json!({"heartRate": 5, "spo2": 300, "temperatureC": -4}),
            DecodeMode::Strict,
        )
        .unwrap();
        assert_eq!(input.heart_rate, 5.0);
        assert_eq!(input.spo2, 300.0);
    }
}
