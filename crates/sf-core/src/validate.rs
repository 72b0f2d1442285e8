//! Validation of raw camera event records.
//!
//! Records arrive as loosely typed JSON. Each one is checked on its own so a
//! single bad record is reported without discarding the rest of the batch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::event::Event;
use crate::event_kind::EventKind;
use crate::types::{Confidence, StationId, ValidationError, WorkerId};

/// A record as sent by the camera pipeline, before any checks.
///
/// Both `workstation_id` and `station_id` name the location; the former wins
/// when both are present and non-empty.
#[derive(Debug, Deserialize)]
struct RawEvent {
    timestamp: String,
    worker_id: String,
    workstation_id: Option<String>,
    station_id: Option<String>,
    event_type: String,
    confidence: Option<f32>,
    count: Option<i64>,
}

const REQUIRED_FIELDS: [&str; 3] = ["timestamp", "worker_id", "event_type"];

/// A record that failed validation, with its position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub index: usize,
    pub error: ValidationError,
}

/// Outcome of validating a batch.
#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub events: Vec<Event>,
    pub rejected: Vec<Rejected>,
}

/// Splits an ingest document into records.
///
/// A JSON array is a batch; any other value is treated as a single record.
pub fn split_document(document: Value) -> Vec<Value> {
    match document {
        Value::Array(records) => records,
        record => vec![record],
    }
}

/// Validates every record, keeping going past failures.
pub fn validate_batch(records: &[Value]) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    for (index, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(event) => batch.events.push(event),
            Err(error) => {
                tracing::warn!(index, error = %error, "rejecting event record");
                batch.rejected.push(Rejected { index, error });
            }
        }
    }
    batch
}

/// Validates a single record.
///
/// Absent or null required fields are reported before any field is type-checked.
pub fn validate_record(record: &Value) -> Result<Event, ValidationError> {
    let Some(object) = record.as_object() else {
        return Err(ValidationError::NotAnObject);
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| object.get(*field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { fields: missing });
    }

    let RawEvent {
        timestamp,
        worker_id,
        workstation_id,
        station_id,
        event_type,
        confidence,
        count,
    } = RawEvent::deserialize(record).map_err(|err| ValidationError::Malformed {
        message: err.to_string(),
    })?;

    let kind: EventKind = event_type
        .parse()
        .map_err(|_| ValidationError::UnknownEventKind { value: event_type })?;
    let timestamp = parse_timestamp(&timestamp)?;
    let worker_id = WorkerId::new(worker_id)?;
    let station_id = resolve_station(workstation_id, station_id)?;
    let confidence = confidence.map_or(Ok(Confidence::default()), Confidence::new)?;
    let count = count
        .map(|value| u64::try_from(value).map_err(|_| ValidationError::NegativeCount { value }))
        .transpose()?;

    Ok(Event::new(timestamp, worker_id, kind, count)?
        .with_station(station_id)
        .with_confidence(confidence))
}

/// Parses an RFC 3339 timestamp (a trailing `Z` or any offset) into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| ValidationError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

fn resolve_station(
    workstation_id: Option<String>,
    station_id: Option<String>,
) -> Result<Option<StationId>, ValidationError> {
    let non_empty = |id: Option<String>| id.filter(|id| !id.trim().is_empty());
    non_empty(workstation_id)
        .or_else(|| non_empty(station_id))
        .map(StationId::new)
        .transpose()
}
