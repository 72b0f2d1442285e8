//! Interval aggregation.
//!
//! Reconstructs the continuous timeline implied by one entity's sparse state
//! events and totals how long it spent in each duration-bearing state.
//!
//! # Algorithm Summary
//!
//! Each event opens a span that runs until the next event (or, for the last
//! event, until the query cutoff). The span is credited to the event's kind
//! when [`KindPolicy::contributes_duration`](crate::KindPolicy) is set; every
//! kind still closes the span before it. Unit counts accrue at the instant of
//! the event that carries them and are never prorated.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::event_kind::EventKind;

/// An event that can be placed on a timeline.
///
/// This trait allows aggregation to work with different event representations
/// (e.g., validated [`Event`](crate::Event)s or test fixtures).
pub trait TimelineEvent {
    /// Returns the event's timestamp.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Returns the event's kind.
    fn kind(&self) -> EventKind;

    /// Returns the unit count for kinds that carry one.
    fn count(&self) -> Option<u64>;
}

/// Internal consistency violations.
///
/// Seeing one of these means an upstream component handed the aggregator a
/// timeline it promised would be ordered; it is a defect, not bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// An event is earlier than the one before it.
    #[error(
        "events out of order at index {index}: {current} follows {previous}"
    )]
    NonChronological {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// The cutoff falls before the last event, which would give it a negative span.
    #[error("cutoff {cutoff} is before the last event at {last}")]
    CutoffBeforeLastEvent {
        last: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    },

    /// A duration or unit total no longer fits its representation.
    #[error("{what} overflowed while aggregating")]
    Overflow { what: &'static str },
}

/// Per-entity totals produced by [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    durations: BTreeMap<EventKind, Duration>,
    total_units: u64,
}

impl Default for Aggregate {
    /// Zero durations for every duration-bearing kind and no units.
    fn default() -> Self {
        Self {
            durations: EventKind::duration_kinds()
                .map(|kind| (kind, Duration::zero()))
                .collect(),
            total_units: 0,
        }
    }
}

impl Aggregate {
    /// Accumulated duration for `kind`; zero for kinds that never accumulate.
    pub fn duration(&self, kind: EventKind) -> Duration {
        self.durations
            .get(&kind)
            .copied()
            .unwrap_or_else(Duration::zero)
    }

    pub fn working(&self) -> Duration {
        self.duration(EventKind::Working)
    }

    pub fn idle(&self) -> Duration {
        self.duration(EventKind::Idle)
    }

    /// Working plus idle time: the span during which the entity was observed present.
    pub fn tracked(&self) -> Duration {
        self.working() + self.idle()
    }

    pub const fn total_units(&self) -> u64 {
        self.total_units
    }

    fn add_duration(&mut self, kind: EventKind, span: Duration) -> Result<(), AggregateError> {
        let bucket = self.durations.entry(kind).or_insert_with(Duration::zero);
        *bucket = bucket
            .checked_add(&span)
            .ok_or(AggregateError::Overflow { what: "duration" })?;
        Ok(())
    }

    fn add_units(&mut self, count: u64) -> Result<(), AggregateError> {
        self.total_units = self
            .total_units
            .checked_add(count)
            .ok_or(AggregateError::Overflow { what: "unit count" })?;
        Ok(())
    }
}

/// Aggregates one entity's timeline up to `cutoff`.
///
/// Events must be sorted by timestamp ascending. Events sharing a timestamp
/// are taken in the order given; the zero-length span between them credits
/// nothing, but it decides which kind owns the following span.
///
/// The cutoff is shared by every entity in a query and must not be earlier
/// than the last event. This function never reads the clock.
pub fn aggregate<E: TimelineEvent>(
    events: &[E],
    cutoff: DateTime<Utc>,
) -> Result<Aggregate, AggregateError> {
    let mut result = Aggregate::default();

    for (index, event) in events.iter().enumerate() {
        let start = event.timestamp();
        let span_end = events.get(index + 1).map_or(cutoff, TimelineEvent::timestamp);

        if span_end < start {
            return Err(if index + 1 < events.len() {
                AggregateError::NonChronological {
                    index: index + 1,
                    previous: start,
                    current: span_end,
                }
            } else {
                AggregateError::CutoffBeforeLastEvent {
                    last: start,
                    cutoff,
                }
            });
        }

        let kind = event.kind();
        let policy = kind.policy();

        if policy.contributes_duration {
            result.add_duration(kind, span_end - start)?;
        }

        if policy.carries_count {
            if let Some(count) = event.count() {
                result.add_units(count)?;
            }
        }
    }

    Ok(result)
}
