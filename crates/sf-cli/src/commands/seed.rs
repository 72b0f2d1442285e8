//! Seed command: replaces all data with a sample facility.
//!
//! Six workers each spend 2026-01-15 at one workstation (W6 also visits S1),
//! moving between working, idle and absent and reporting unit counts along the way.

use std::io::Write;

use anyhow::{Context, Result};
use sf_core::validate::parse_timestamp;
use sf_core::{Confidence, Event, EventKind, StationId, WorkerId};
use sf_db::{Database, InsertOutcome, WorkerRecord, WorkstationRecord};

const SAMPLE_DATE: &str = "2026-01-15";

const WORKERS: [(&str, &str); 6] = [
    ("W1", "Lionel Messi"),
    ("W2", "Neymar Jr."),
    ("W3", "Luiz Saurez"),
    ("W4", "David Beckham"),
    ("W5", "Lautero Martinez"),
    ("W6", "Roberto Carlos"),
];

const WORKSTATIONS: [(&str, &str); 6] = [
    ("S1", "Assembly Line A"),
    ("S2", "Assembly Line B"),
    ("S3", "Quality Control"),
    ("S4", "Packaging Station"),
    ("S5", "Inspection Bay"),
    ("S6", "Finishing Station"),
];

/// `(time of day, worker, workstation, kind, confidence, count)`
type SampleEvent = (
    &'static str,
    &'static str,
    &'static str,
    EventKind,
    f32,
    Option<u64>,
);

const SAMPLE_EVENTS: [SampleEvent; 48] = {
    use EventKind::{Absent, Idle, ProductionCount as Count, Working};
    [
        ("08:00", "W1", "S1", Working, 0.95, None),
        ("10:00", "W1", "S1", Count, 0.98, Some(25)),
        ("10:30", "W1", "S1", Idle, 0.87, None),
        ("10:45", "W1", "S1", Working, 0.92, None),
        ("12:00", "W1", "S1", Count, 0.96, Some(18)),
        ("12:30", "W1", "S1", Idle, 0.89, None),
        ("13:00", "W1", "S1", Working, 0.94, None),
        ("15:00", "W1", "S1", Count, 0.97, Some(30)),
        ("16:00", "W1", "S1", Absent, 0.91, None),
        ("08:00", "W2", "S2", Working, 0.96, None),
        ("09:30", "W2", "S2", Count, 0.99, Some(35)),
        ("11:00", "W2", "S2", Count, 0.97, Some(40)),
        ("12:00", "W2", "S2", Idle, 0.85, None),
        ("12:30", "W2", "S2", Working, 0.93, None),
        ("14:00", "W2", "S2", Count, 0.98, Some(38)),
        ("15:30", "W2", "S2", Count, 0.96, Some(32)),
        ("16:00", "W2", "S2", Absent, 0.92, None),
        ("08:30", "W3", "S3", Working, 0.94, None),
        ("10:00", "W3", "S3", Count, 0.95, Some(50)),
        ("11:30", "W3", "S3", Idle, 0.88, None),
        ("12:00", "W3", "S3", Working, 0.91, None),
        ("13:30", "W3", "S3", Count, 0.97, Some(55)),
        ("15:00", "W3", "S3", Count, 0.94, Some(45)),
        ("16:00", "W3", "S3", Absent, 0.90, None),
        ("08:00", "W4", "S4", Working, 0.93, None),
        ("09:00", "W4", "S4", Idle, 0.82, None),
        ("09:30", "W4", "S4", Working, 0.95, None),
        ("11:00", "W4", "S4", Count, 0.96, Some(60)),
        ("12:30", "W4", "S4", Idle, 0.86, None),
        ("13:00", "W4", "S4", Working, 0.92, None),
        ("14:30", "W4", "S4", Count, 0.98, Some(55)),
        ("16:00", "W4", "S4", Absent, 0.89, None),
        ("08:00", "W5", "S5", Working, 0.97, None),
        ("10:30", "W5", "S5", Count, 0.95, Some(70)),
        ("11:00", "W5", "S5", Idle, 0.84, None),
        ("11:30", "W5", "S5", Working, 0.93, None),
        ("13:00", "W5", "S5", Count, 0.96, Some(65)),
        ("14:30", "W5", "S5", Count, 0.97, Some(60)),
        ("16:00", "W5", "S5", Absent, 0.91, None),
        ("08:00", "W6", "S6", Working, 0.94, None),
        ("09:30", "W6", "S6", Count, 0.92, Some(20)),
        ("10:00", "W6", "S1", Working, 0.95, None),
        ("11:00", "W6", "S1", Count, 0.93, Some(15)),
        ("11:30", "W6", "S6", Idle, 0.86, None),
        ("12:00", "W6", "S6", Working, 0.91, None),
        ("14:00", "W6", "S6", Count, 0.97, Some(25)),
        ("15:30", "W6", "S6", Count, 0.94, Some(22)),
        ("16:00", "W6", "S6", Absent, 0.90, None),
    ]
};

fn sample_event(
    (time, worker, station, kind, confidence, count): SampleEvent,
) -> Result<Event> {
    let timestamp = parse_timestamp(&format!("{SAMPLE_DATE}T{time}:00Z"))?;
    Ok(Event::new(timestamp, WorkerId::new(worker)?, kind, count)?
        .with_station(Some(StationId::new(station)?))
        .with_confidence(Confidence::new(confidence)?))
}

/// Replaces everything in `db` with the sample facility.
pub fn load_sample(db: &mut Database) -> Result<InsertOutcome> {
    let workers = WORKERS
        .iter()
        .map(|(id, name)| -> Result<WorkerRecord> {
            Ok(WorkerRecord {
                worker_id: WorkerId::new(*id)?,
                name: (*name).to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let stations = WORKSTATIONS
        .iter()
        .map(|(id, name)| -> Result<WorkstationRecord> {
            Ok(WorkstationRecord {
                station_id: StationId::new(*id)?,
                name: (*name).to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let events = SAMPLE_EVENTS
        .into_iter()
        .map(sample_event)
        .collect::<Result<Vec<_>>>()?;

    db.replace_all(&workers, &stations, &events)
        .context("failed to write sample data")
}

/// Runs the seed command.
pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let outcome = load_sample(db)?;
    tracing::info!(events = outcome.inserted, "seeded sample facility");
    writeln!(
        writer,
        "Seeded {} workers, {} workstations, {} events",
        WORKERS.len(),
        WORKSTATIONS.len(),
        outcome.inserted
    )?;
    Ok(())
}
