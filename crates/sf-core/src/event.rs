//! Validated camera events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::TimelineEvent;
use crate::event_kind::EventKind;
use crate::types::{Confidence, StationId, ValidationError, WorkerId};

/// A state change observed by a camera, after validation.
///
/// A `count` is present exactly when the kind carries one
/// (see [`EventKind::policy`]); the constructor enforces this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    timestamp: DateTime<Utc>,
    worker_id: WorkerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    station_id: Option<StationId>,
    #[serde(rename = "event_type")]
    kind: EventKind,
    confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
}

impl Event {
    /// Creates an event, checking the count invariant.
    pub fn new(
        timestamp: DateTime<Utc>,
        worker_id: WorkerId,
        kind: EventKind,
        count: Option<u64>,
    ) -> Result<Self, ValidationError> {
        match (kind.policy().carries_count, count) {
            (true, None) => return Err(ValidationError::MissingCount),
            (false, Some(_)) => return Err(ValidationError::UnexpectedCount { kind }),
            _ => {}
        }
        Ok(Self {
            timestamp,
            worker_id,
            station_id: None,
            kind,
            confidence: Confidence::default(),
            count,
        })
    }

    /// Sets the workstation the event was observed at.
    #[must_use]
    pub fn with_station(mut self, station_id: Option<StationId>) -> Self {
        self.station_id = station_id;
        self
    }

    /// Sets the camera confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }

    pub const fn station_id(&self) -> Option<&StationId> {
        self.station_id.as_ref()
    }

    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub const fn count(&self) -> Option<u64> {
        self.count
    }
}

impl TimelineEvent for Event {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn kind(&self) -> EventKind {
        self.kind
    }

    fn count(&self) -> Option<u64> {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
    }

    fn worker() -> WorkerId {
        WorkerId::new("W1").unwrap()
    }

    #[test]
    fn production_count_requires_count() {
        let err = Event::new(ts(), worker(), EventKind::ProductionCount, None).unwrap_err();
        assert_eq!(err, ValidationError::MissingCount);
    }

    #[test]
    fn state_events_reject_count() {
        let err = Event::new(ts(), worker(), EventKind::Working, Some(3)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnexpectedCount {
                kind: EventKind::Working
            }
        );
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let event = Event::new(ts(), worker(), EventKind::ProductionCount, Some(25))
            .unwrap()
            .with_station(Some(StationId::new("S1").unwrap()))
            .with_confidence(Confidence::new(0.5).unwrap());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": "2026-01-15T08:00:00Z",
                "worker_id": "W1",
                "station_id": "S1",
                "event_type": "product_count",
                "confidence": 0.5,
                "count": 25
            })
        );
    }

    #[test]
    fn omits_absent_station_and_count() {
        let event = Event::new(ts(), worker(), EventKind::Idle, None).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("station_id").is_none());
        assert!(json.get("count").is_none());
        assert_eq!(json["confidence"], 0.0);
    }
}
