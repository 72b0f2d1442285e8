//! Core domain logic for shopfloor.
//!
//! This crate contains the fundamental types and logic for:
//! - Validation: turning raw camera records into [`Event`]s
//! - Aggregation: reconstructing per-entity timelines up to a shared cutoff
//! - Metrics: utilization and throughput ratios for workers, workstations and
//!   the whole facility
//!
//! Nothing here touches storage or the clock; callers pass the cutoff in.

mod aggregate;
mod event;
pub mod event_kind;
pub mod metrics;
pub mod types;
pub mod validate;

pub use aggregate::{Aggregate, AggregateError, TimelineEvent, aggregate};
pub use event::Event;
pub use event_kind::{EventKind, KindPolicy, UnknownEventKind};
pub use metrics::{
    FactoryMetrics, WorkerMetrics, WorkstationMetrics, factory_metrics, worker_metrics,
    workstation_metrics,
};
pub use types::{Confidence, StationId, ValidationError, WorkerId};
pub use validate::{Rejected, ValidatedBatch, validate_batch, validate_record};
