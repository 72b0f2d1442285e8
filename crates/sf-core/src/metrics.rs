//! Productivity ratios derived from [`Aggregate`]s.
//!
//! Every ratio whose denominator is zero evaluates to `0.0`. Values are kept at
//! full precision; call `rounded()` only when presenting them.

use chrono::Duration;
use serde::Serialize;

use crate::aggregate::Aggregate;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Decimal places for hour figures.
pub const HOURS_PRECISION: i32 = 2;

/// Decimal places for percentages and per-hour rates.
pub const RATIO_PRECISION: i32 = 1;

/// Per-worker metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkerMetrics {
    #[serde(rename = "active_time_hours")]
    pub active_hours: f64,
    #[serde(rename = "idle_time_hours")]
    pub idle_hours: f64,
    pub utilization_percent: f64,
    pub total_units_produced: u64,
    pub units_per_hour: f64,
}

impl WorkerMetrics {
    /// Rounds for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            active_hours: round_to(self.active_hours, HOURS_PRECISION),
            idle_hours: round_to(self.idle_hours, HOURS_PRECISION),
            utilization_percent: round_to(self.utilization_percent, RATIO_PRECISION),
            total_units_produced: self.total_units_produced,
            units_per_hour: round_to(self.units_per_hour, RATIO_PRECISION),
        }
    }
}

/// Per-workstation metrics.
///
/// Throughput is measured against occupancy hours, not productive hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkstationMetrics {
    pub occupancy_hours: f64,
    pub utilization_percent: f64,
    pub total_units_produced: u64,
    pub throughput_rate: f64,
}

impl WorkstationMetrics {
    /// Rounds for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            occupancy_hours: round_to(self.occupancy_hours, HOURS_PRECISION),
            utilization_percent: round_to(self.utilization_percent, RATIO_PRECISION),
            total_units_produced: self.total_units_produced,
            throughput_rate: round_to(self.throughput_rate, RATIO_PRECISION),
        }
    }
}

/// Facility-wide metrics, summed over workers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactoryMetrics {
    pub total_productive_hours: f64,
    pub total_idle_hours: f64,
    pub total_production_count: u64,
    pub average_production_rate: f64,
    pub average_worker_utilization: f64,
    /// Workers considered, with or without events.
    pub active_workers: usize,
    /// Workers with any working or idle time; the utilization average covers only these.
    pub workers_with_activity: usize,
}

impl FactoryMetrics {
    /// Rounds for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            total_productive_hours: round_to(self.total_productive_hours, HOURS_PRECISION),
            total_idle_hours: round_to(self.total_idle_hours, HOURS_PRECISION),
            average_production_rate: round_to(self.average_production_rate, RATIO_PRECISION),
            average_worker_utilization: round_to(
                self.average_worker_utilization,
                RATIO_PRECISION,
            ),
            ..*self
        }
    }
}

/// Derives worker metrics from one worker's aggregate.
pub fn worker_metrics(aggregate: &Aggregate) -> WorkerMetrics {
    let active_hours = hours(aggregate.working());
    WorkerMetrics {
        active_hours,
        idle_hours: hours(aggregate.idle()),
        utilization_percent: percent(aggregate.working(), aggregate.tracked()),
        total_units_produced: aggregate.total_units(),
        units_per_hour: per_hour(aggregate.total_units(), active_hours),
    }
}

/// Derives workstation metrics from one station's aggregate.
///
/// Any working or idle event at the station counts as occupancy.
pub fn workstation_metrics(aggregate: &Aggregate) -> WorkstationMetrics {
    let occupancy = aggregate.tracked();
    let occupancy_hours = hours(occupancy);
    WorkstationMetrics {
        occupancy_hours,
        utilization_percent: percent(aggregate.working(), occupancy),
        total_units_produced: aggregate.total_units(),
        throughput_rate: per_hour(aggregate.total_units(), occupancy_hours),
    }
}

/// Derives facility metrics from every worker's aggregate.
///
/// Workers with no tracked time are counted in `active_workers` but left out
/// of the utilization average rather than pulling it toward zero.
pub fn factory_metrics(workers: &[Aggregate]) -> FactoryMetrics {
    let mut productive_hours = 0.0;
    let mut idle_hours = 0.0;
    let mut total_units: u64 = 0;
    let mut utilization_sum = 0.0;
    let mut workers_with_activity = 0_usize;

    for aggregate in workers {
        productive_hours += hours(aggregate.working());
        idle_hours += hours(aggregate.idle());
        total_units = total_units.saturating_add(aggregate.total_units());

        if aggregate.tracked() > Duration::zero() {
            utilization_sum += percent(aggregate.working(), aggregate.tracked());
            workers_with_activity += 1;
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "worker counts are far below f64 mantissa limits"
    )]
    let average_worker_utilization = if workers_with_activity > 0 {
        utilization_sum / workers_with_activity as f64
    } else {
        0.0
    };

    FactoryMetrics {
        total_productive_hours: productive_hours,
        total_idle_hours: idle_hours,
        total_production_count: total_units,
        average_production_rate: per_hour(total_units, productive_hours),
        average_worker_utilization,
        active_workers: workers.len(),
        workers_with_activity,
    }
}

/// Rounds half away from zero to `places` decimal places.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[allow(
    clippy::cast_precision_loss,
    reason = "millisecond totals stay well within f64 precision for realistic spans"
)]
fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

fn percent(part: Duration, whole: Duration) -> f64 {
    if whole <= Duration::zero() {
        return 0.0;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "millisecond totals stay well within f64 precision for realistic spans"
    )]
    let ratio = part.num_milliseconds() as f64 / whole.num_milliseconds() as f64;
    ratio * 100.0
}

fn per_hour(units: u64, hours: f64) -> f64 {
    if hours > 0.0 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "unit counts stay well within f64 precision"
        )]
        let units = units as f64;
        units / hours
    } else {
        0.0
    }
}
