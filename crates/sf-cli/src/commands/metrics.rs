//! Metrics command: per-worker, per-workstation and facility reports.
//!
//! Every report shares one cutoff, taken from the store before any timeline is
//! read. Each entity's events are fetched into an owned snapshot first, then
//! aggregated in parallel; the connection never crosses threads.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;

use sf_core::{
    Aggregate, AggregateError, Event, FactoryMetrics, StationId, WorkerId, WorkerMetrics,
    WorkstationMetrics, aggregate, factory_metrics, worker_metrics, workstation_metrics,
};
use sf_db::Database;

use crate::MetricsScope;

/// A metrics payload with the instants it was computed against.
#[derive(Debug, Serialize)]
pub struct MetricsReport<T> {
    pub metrics: T,
    #[serde(serialize_with = "serialize_instant")]
    pub cutoff_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_instant")]
    pub computed_at: DateTime<Utc>,
}

/// One row of the worker report.
#[derive(Debug, Serialize)]
pub struct WorkerEntry {
    pub worker_id: WorkerId,
    pub name: String,
    #[serde(flatten)]
    pub metrics: WorkerMetrics,
}

/// One row of the workstation report.
#[derive(Debug, Serialize)]
pub struct WorkstationEntry {
    pub station_id: StationId,
    pub name: String,
    #[serde(flatten)]
    pub metrics: WorkstationMetrics,
}

fn serialize_instant<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Aggregates each snapshot against the shared cutoff, in parallel.
fn aggregate_snapshots<K: Send>(
    snapshots: Vec<(K, Vec<Event>)>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<(K, Aggregate)>, AggregateError> {
    snapshots
        .into_par_iter()
        .map(|(key, events)| aggregate(&events, cutoff).map(|totals| (key, totals)))
        .collect()
}

/// Builds the worker report over every registered worker.
pub fn worker_report(
    db: &Database,
    computed_at: DateTime<Utc>,
) -> Result<MetricsReport<Vec<WorkerEntry>>> {
    let cutoff = db.global_cutoff()?;
    let mut snapshots = Vec::new();
    for worker in db.list_workers()? {
        let events = db.events_for_worker(&worker.worker_id)?;
        snapshots.push((worker, events));
    }
    tracing::debug!(workers = snapshots.len(), %cutoff, "computing worker metrics");

    let metrics = aggregate_snapshots(snapshots, cutoff)
        .context("worker timelines are inconsistent")?
        .into_iter()
        .map(|(worker, totals)| WorkerEntry {
            worker_id: worker.worker_id,
            name: worker.name,
            metrics: worker_metrics(&totals).rounded(),
        })
        .collect();

    Ok(MetricsReport {
        metrics,
        cutoff_time: cutoff,
        computed_at,
    })
}

/// Builds the workstation report over every registered workstation.
pub fn workstation_report(
    db: &Database,
    computed_at: DateTime<Utc>,
) -> Result<MetricsReport<Vec<WorkstationEntry>>> {
    let cutoff = db.global_cutoff()?;
    let mut snapshots = Vec::new();
    for station in db.list_workstations()? {
        let events = db.events_for_station(&station.station_id)?;
        snapshots.push((station, events));
    }
    tracing::debug!(workstations = snapshots.len(), %cutoff, "computing workstation metrics");

    let metrics = aggregate_snapshots(snapshots, cutoff)
        .context("workstation timelines are inconsistent")?
        .into_iter()
        .map(|(station, totals)| WorkstationEntry {
            station_id: station.station_id,
            name: station.name,
            metrics: workstation_metrics(&totals).rounded(),
        })
        .collect();

    Ok(MetricsReport {
        metrics,
        cutoff_time: cutoff,
        computed_at,
    })
}

/// Builds the facility report, summing over every registered worker.
pub fn factory_report(
    db: &Database,
    computed_at: DateTime<Utc>,
) -> Result<MetricsReport<FactoryMetrics>> {
    let cutoff = db.global_cutoff()?;
    let mut snapshots = Vec::new();
    for worker in db.list_workers()? {
        let events = db.events_for_worker(&worker.worker_id)?;
        snapshots.push(((), events));
    }

    let totals: Vec<Aggregate> = aggregate_snapshots(snapshots, cutoff)
        .context("worker timelines are inconsistent")?
        .into_iter()
        .map(|((), totals)| totals)
        .collect();

    Ok(MetricsReport {
        metrics: factory_metrics(&totals).rounded(),
        cutoff_time: cutoff,
        computed_at,
    })
}

fn format_cutoff(cutoff: DateTime<Utc>) -> String {
    cutoff.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Writes the human-readable worker table.
pub fn format_workers<W: Write>(
    writer: &mut W,
    report: &MetricsReport<Vec<WorkerEntry>>,
) -> std::io::Result<()> {
    writeln!(writer, "WORKER METRICS (through {})", format_cutoff(report.cutoff_time))?;
    writeln!(writer, "──────────────")?;
    if report.metrics.is_empty() {
        writeln!(writer, "No workers registered.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{:<6} {:<20} {:>8} {:>8} {:>6} {:>6} {:>8}",
        "ID", "NAME", "ACTIVE", "IDLE", "UTIL%", "UNITS", "UNITS/H"
    )?;
    for entry in &report.metrics {
        let m = &entry.metrics;
        writeln!(
            writer,
            "{:<6} {:<20} {:>7.2}h {:>7.2}h {:>6.1} {:>6} {:>8.1}",
            entry.worker_id.as_str(),
            entry.name,
            m.active_hours,
            m.idle_hours,
            m.utilization_percent,
            m.total_units_produced,
            m.units_per_hour,
        )?;
    }
    Ok(())
}

/// Writes the human-readable workstation table.
pub fn format_workstations<W: Write>(
    writer: &mut W,
    report: &MetricsReport<Vec<WorkstationEntry>>,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "WORKSTATION METRICS (through {})",
        format_cutoff(report.cutoff_time)
    )?;
    writeln!(writer, "───────────────────")?;
    if report.metrics.is_empty() {
        writeln!(writer, "No workstations registered.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{:<6} {:<20} {:>9} {:>6} {:>6} {:>8}",
        "ID", "NAME", "OCCUPIED", "UTIL%", "UNITS", "UNITS/H"
    )?;
    for entry in &report.metrics {
        let m = &entry.metrics;
        writeln!(
            writer,
            "{:<6} {:<20} {:>8.2}h {:>6.1} {:>6} {:>8.1}",
            entry.station_id.as_str(),
            entry.name,
            m.occupancy_hours,
            m.utilization_percent,
            m.total_units_produced,
            m.throughput_rate,
        )?;
    }
    Ok(())
}

/// Writes the human-readable facility summary.
pub fn format_factory<W: Write>(
    writer: &mut W,
    report: &MetricsReport<FactoryMetrics>,
) -> std::io::Result<()> {
    let m = &report.metrics;
    writeln!(writer, "FACTORY SUMMARY (through {})", format_cutoff(report.cutoff_time))?;
    writeln!(writer, "───────────────")?;
    writeln!(writer, "Productive time:     {:.2}h", m.total_productive_hours)?;
    writeln!(writer, "Idle time:           {:.2}h", m.total_idle_hours)?;
    writeln!(writer, "Units produced:      {}", m.total_production_count)?;
    writeln!(writer, "Production rate:     {:.1} units/h", m.average_production_rate)?;
    writeln!(
        writer,
        "Avg utilization:     {:.1}% ({} of {} workers active)",
        m.average_worker_utilization, m.workers_with_activity, m.active_workers
    )?;
    Ok(())
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, report: &T) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Runs the metrics command.
pub fn run<W: Write>(writer: &mut W, db: &Database, scope: MetricsScope, json: bool) -> Result<()> {
    let computed_at = Utc::now();
    match scope {
        MetricsScope::Workers => {
            let report = worker_report(db, computed_at)?;
            if json {
                write_json(writer, &report)?;
            } else {
                format_workers(writer, &report)?;
            }
        }
        MetricsScope::Workstations => {
            let report = workstation_report(db, computed_at)?;
            if json {
                write_json(writer, &report)?;
            } else {
                format_workstations(writer, &report)?;
            }
        }
        MetricsScope::Factory => {
            let report = factory_report(db, computed_at)?;
            if json {
                write_json(writer, &report)?;
            } else {
                format_factory(writer, &report)?;
            }
        }
    }
    Ok(())
}
