//! Core type definitions with validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::event_kind::EventKind;

/// Validation errors for incoming event records.
///
/// These describe bad input, never a defect in the engine. A batch keeps going
/// past a record that fails with one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// One or more required fields were absent (or null).
    #[error("missing fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// The record was not a JSON object.
    #[error("event record must be a JSON object")]
    NotAnObject,

    /// A field had the wrong JSON type.
    #[error("malformed event record: {message}")]
    Malformed { message: String },

    /// The event type is not one of the known kinds.
    #[error("invalid event_type: {value}")]
    UnknownEventKind { value: String },

    /// The timestamp was not RFC 3339.
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The confidence value was out of range.
    #[error("confidence must be between 0.0 and 1.0, got {value}")]
    ConfidenceOutOfRange { value: f32 },

    /// A `product_count` event without a count.
    #[error("product_count event requires a count")]
    MissingCount,

    /// A count attached to a kind that does not carry one.
    #[error("count is only valid for product_count events, got {kind}")]
    UnexpectedCount { kind: EventKind },

    /// A negative production count.
    #[error("count cannot be negative, got {value}")]
    NegativeCount { value: i64 },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_string_id!(
    /// A validated worker identifier (e.g. `W1`).
    ///
    /// Events may reference a worker ID that was never registered.
    WorkerId, "worker_id"
);

define_string_id!(
    /// A validated workstation identifier (e.g. `S1`).
    StationId, "station_id"
);

/// A camera confidence score in the range \[0.0, 1.0\].
///
/// Carried through storage untouched; the engine never weights by it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f32);

impl Confidence {
    /// The minimum confidence value (0.0).
    pub const MIN: Self = Self(0.0);

    /// Creates a new confidence value after validation.
    ///
    /// Returns an error if the value is outside \[0.0, 1.0\] or is NaN.
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping to \[0.0, 1.0\].
    ///
    /// NaN values become 0.0. Values outside the range are clamped.
    #[must_use]
    pub const fn clamped(value: f32) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value > 1.0 {
            Self(1.0)
        } else {
            Self(value)
        }
    }

    /// Returns the inner f32 value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Records that omit a confidence score are stored as 0.0.
impl Default for Confidence {
    fn default() -> Self {
        Self::MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_rejects_empty() {
        assert!(WorkerId::new("").is_err());
        assert!(WorkerId::new("   ").is_err());
        assert!(WorkerId::new("W1").is_ok());
    }

    #[test]
    fn station_id_rejects_empty() {
        let err = StationId::new("").unwrap_err();
        assert_eq!(err.to_string(), "station_id cannot be empty");
        assert!(StationId::new("S1").is_ok());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let worker = WorkerId::new("W3").unwrap();
        let station = StationId::new("S1").unwrap();
        assert_eq!(serde_json::to_string(&worker).unwrap(), "\"W3\"");
        assert_eq!(serde_json::to_string(&station).unwrap(), "\"S1\"");
        assert_eq!(worker.to_string(), "W3");
    }

    #[test]
    fn missing_fields_message_lists_fields() {
        let err = ValidationError::MissingFields {
            fields: vec!["timestamp", "event_type"],
        };
        assert_eq!(err.to_string(), "missing fields: timestamp, event_type");
    }

    #[test]
    fn confidence_validates_range() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(0.95).is_ok());
        assert!(Confidence::new(1.0).is_ok());
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(1.1).is_err());
        assert!(Confidence::new(f32::NAN).is_err());
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for boundary tests"
    )]
    fn confidence_clamped_handles_edge_cases() {
        assert_eq!(Confidence::clamped(-1.0).value(), 0.0);
        assert_eq!(Confidence::clamped(2.0).value(), 1.0);
        assert_eq!(Confidence::clamped(f32::NAN).value(), 0.0);
        assert_eq!(Confidence::clamped(0.5).value(), 0.5);
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for default value"
    )]
    fn confidence_default_is_zero() {
        assert_eq!(Confidence::default().value(), 0.0);
    }

    #[test]
    fn confidence_serializes_as_number() {
        let json = serde_json::to_value(Confidence::new(0.5).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!(0.5));
    }
}
