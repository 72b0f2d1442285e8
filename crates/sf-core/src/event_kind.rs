//! Event kind enum as the single source of truth for event type strings
//! and for how each kind is treated on a timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The state change a camera reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Working,
    Idle,
    Absent,
    ProductionCount,
}

/// How an event kind participates in interval aggregation.
///
/// Every kind terminates the span opened by the event before it; the policy
/// only decides what the kind's own span and payload contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    /// The span starting at this event is credited to the kind's bucket.
    pub contributes_duration: bool,
    /// The event carries a unit count that accrues at its instant.
    pub carries_count: bool,
}

impl EventKind {
    /// All kinds, in wire order.
    pub const ALL: [Self; 4] = [
        Self::Working,
        Self::Idle,
        Self::Absent,
        Self::ProductionCount,
    ];

    /// Duration and count policy for this kind.
    #[must_use]
    pub const fn policy(self) -> KindPolicy {
        match self {
            Self::Working | Self::Idle => KindPolicy {
                contributes_duration: true,
                carries_count: false,
            },
            Self::Absent => KindPolicy {
                contributes_duration: false,
                carries_count: false,
            },
            Self::ProductionCount => KindPolicy {
                contributes_duration: false,
                carries_count: true,
            },
        }
    }

    /// Kinds whose spans are accumulated, in declaration order.
    pub fn duration_kinds() -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.policy().contributes_duration)
    }

    /// String representation used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Idle => "idle",
            Self::Absent => "absent",
            Self::ProductionCount => "product_count",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working" => Ok(Self::Working),
            "idle" => Ok(Self::Idle),
            "absent" => Ok(Self::Absent),
            "product_count" => Ok(Self::ProductionCount),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl UnknownEventKind {
    /// The string that failed to parse.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}
