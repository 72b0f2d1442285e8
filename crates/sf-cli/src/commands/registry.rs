//! Worker and workstation registry commands.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use sf_core::{StationId, WorkerId};
use sf_db::Database;

use crate::RegisterTarget;

#[derive(Serialize)]
struct WorkerJson<'a> {
    worker_id: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct WorkstationJson<'a> {
    station_id: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct WorkersJson<'a> {
    workers: Vec<WorkerJson<'a>>,
}

#[derive(Serialize)]
struct WorkstationsJson<'a> {
    workstations: Vec<WorkstationJson<'a>>,
}

/// Lists registered workers.
pub fn list_workers<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let workers = db.list_workers()?;

    if json {
        let output = WorkersJson {
            workers: workers
                .iter()
                .map(|w| WorkerJson {
                    worker_id: w.worker_id.as_str(),
                    name: &w.name,
                })
                .collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if workers.is_empty() {
        writeln!(writer, "No workers registered.")?;
        return Ok(());
    }
    for worker in &workers {
        writeln!(writer, "{:<8} {}", worker.worker_id.as_str(), worker.name)?;
    }
    Ok(())
}

/// Lists registered workstations.
pub fn list_workstations<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let stations = db.list_workstations()?;

    if json {
        let output = WorkstationsJson {
            workstations: stations
                .iter()
                .map(|s| WorkstationJson {
                    station_id: s.station_id.as_str(),
                    name: &s.name,
                })
                .collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if stations.is_empty() {
        writeln!(writer, "No workstations registered.")?;
        return Ok(());
    }
    for station in &stations {
        writeln!(writer, "{:<8} {}", station.station_id.as_str(), station.name)?;
    }
    Ok(())
}

/// Registers a worker or workstation. Re-registering an ID keeps the first name.
pub fn register<W: Write>(writer: &mut W, db: &mut Database, target: &RegisterTarget) -> Result<()> {
    match target {
        RegisterTarget::Worker { id, name } => {
            let worker_id = WorkerId::new(id.clone()).context("invalid worker ID")?;
            if db.register_worker(&worker_id, name)? {
                tracing::debug!(%worker_id, "registered worker");
                writeln!(writer, "Registered worker {worker_id} ({name})")?;
            } else {
                writeln!(writer, "Worker {worker_id} is already registered")?;
            }
        }
        RegisterTarget::Workstation { id, name } => {
            let station_id = StationId::new(id.clone()).context("invalid workstation ID")?;
            if db.register_workstation(&station_id, name)? {
                tracing::debug!(%station_id, "registered workstation");
                writeln!(writer, "Registered workstation {station_id} ({name})")?;
            } else {
                writeln!(writer, "Workstation {station_id} is already registered")?;
            }
        }
    }
    Ok(())
}
