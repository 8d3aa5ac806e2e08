//! Field extraction for deserializing stored object records.
//!
//! A corrupt or truncated record is external data corruption, not an
//! expected "not found": these helpers surface a typed
//! [`SerializedFormError`] rather than silently defaulting required
//! fields. Optional fields with the wrong JSON type are also errors — a
//! string where an array should be means the record is damaged.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a serialized object record could not be reconstructed.
#[derive(Debug, Error)]
pub enum SerializedFormError {
    /// The record is not a JSON object.
    #[error("serialized form is not a JSON object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present with the wrong JSON type.
    #[error("field `{field}` is not a {expected}")]
    InvalidField {
        /// The offending field name.
        field: &'static str,
        /// The JSON type the field must have.
        expected: &'static str,
    },

    /// The record's `type` does not match the constructing type.
    #[error("serialized type is `{found}`, expected `{expected}`")]
    TypeMismatch {
        /// The tag the constructor expected.
        expected: String,
        /// The tag found in the record.
        found: String,
    },

    /// A structured section (frame, metadata) failed to deserialize.
    #[error("malformed `{section}` section")]
    Malformed {
        /// The section that failed.
        section: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A date field does not parse as RFC 3339.
    #[error("invalid date in field `{field}`")]
    InvalidDate {
        /// The offending field name.
        field: &'static str,
        /// The underlying parse error.
        #[source]
        source: chrono::ParseError,
    },
}

/// The record as a JSON object map.
pub(crate) fn require_object(value: &Value) -> Result<&Map<String, Value>, SerializedFormError> {
    value.as_object().ok_or(SerializedFormError::NotAnObject)
}

/// A required string field.
pub(crate) fn require_str<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, SerializedFormError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(SerializedFormError::MissingField(field)),
        Some(value) => value.as_str().ok_or(SerializedFormError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

/// An optional string field; absent and `null` both read as `None`.
pub(crate) fn optional_str(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, SerializedFormError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_owned()))
            .ok_or(SerializedFormError::InvalidField {
                field,
                expected: "string",
            }),
    }
}

/// An optional numeric field.
pub(crate) fn optional_f64(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, SerializedFormError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(SerializedFormError::InvalidField {
                field,
                expected: "number",
            }),
    }
}

/// A string-array field; absent reads as empty.
pub(crate) fn str_list(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, SerializedFormError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(ToOwned::to_owned)
                    .ok_or(SerializedFormError::InvalidField {
                        field,
                        expected: "array of strings",
                    })
            })
            .collect(),
        Some(_) => Err(SerializedFormError::InvalidField {
            field,
            expected: "array of strings",
        }),
    }
}

/// An optional RFC 3339 date field, parsed back to a UTC timestamp.
pub(crate) fn optional_date(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, SerializedFormError> {
    match optional_str(record, field)? {
        None => Ok(None),
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .map(|date| Some(date.with_timezone(&Utc)))
            .map_err(|source| SerializedFormError::InvalidDate { field, source }),
    }
}

/// The record's `data` section as an owned map; absent reads as empty.
pub(crate) fn data_section(
    record: &Map<String, Value>,
) -> Result<Map<String, Value>, SerializedFormError> {
    match record.get("data") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(entries)) => Ok(entries.clone()),
        Some(_) => Err(SerializedFormError::InvalidField {
            field: "data",
            expected: "object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let r = record(json!({ "other": 1 }));
        assert!(matches!(
            require_str(&r, "id"),
            Err(SerializedFormError::MissingField("id"))
        ));
    }

    #[test]
    fn null_optional_fields_read_as_none() {
        let r = record(json!({ "subject": null }));
        assert_eq!(optional_str(&r, "subject").ok(), Some(None));
    }

    #[test]
    fn wrong_type_is_corruption_not_default() {
        let r = record(json!({ "tags": "not-an-array" }));
        assert!(matches!(
            str_list(&r, "tags"),
            Err(SerializedFormError::InvalidField { field: "tags", .. })
        ));
    }

    #[test]
    fn dates_parse_back_to_utc() {
        let r = record(json!({ "expiresAt": "2026-01-01T00:00:00+02:00" }));
        let parsed = optional_date(&r, "expiresAt").expect("valid date");
        assert_eq!(
            parsed.map(|d| d.to_rfc3339()),
            Some("2025-12-31T22:00:00+00:00".to_owned())
        );
    }

    #[test]
    fn malformed_dates_are_errors() {
        let r = record(json!({ "expiresAt": "tomorrow" }));
        assert!(matches!(
            optional_date(&r, "expiresAt"),
            Err(SerializedFormError::InvalidDate { .. })
        ));
    }
}
