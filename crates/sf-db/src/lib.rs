//! Storage layer for shopfloor.
//!
//! Provides persistence for camera events and the worker/workstation
//! registries using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Concurrent writers should each open their own `Database` on the same file.
//! Duplicate suppression is enforced by a unique index, so two connections
//! racing to insert the same event store exactly one row; the loser sees the
//! insert ignored and counts it as a duplicate. A busy timeout makes writers
//! wait for each other instead of failing with `SQLITE_BUSY`.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with a fixed nine-digit
//! fraction (e.g., `2026-01-15T08:00:00.000000000Z`). Normalizing on write means:
//! - Lexicographic ordering matches chronological ordering
//! - The same instant written with different offsets hits the same uniqueness key
//! - Distinct instants never share a key, down to the nanosecond
//!
//! ## Duplicate Key
//!
//! `(timestamp, worker_id, event_type)` is unique. Station, confidence and count
//! are deliberately not part of the key.
//!
//! ## Referential Integrity
//!
//! Events may name workers and workstations that were never registered; no
//! foreign keys are declared.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use thiserror::Error;

use sf_core::{Confidence, Event, EventKind, StationId, WorkerId};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const EVENT_COLUMNS: &str = "id, timestamp, worker_id, station_id, event_type, confidence, count";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored event timestamp.
    #[error("invalid timestamp for event {row_id}: {timestamp}")]
    TimestampParse {
        row_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row no longer satisfies the domain invariants.
    #[error("invalid {table} row {row}: {message}")]
    InvalidRow {
        table: &'static str,
        row: String,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A registered worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    pub worker_id: WorkerId,
    pub name: String,
}

/// A registered workstation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkstationRecord {
    pub station_id: StationId,
    pub name: String,
}

/// Result of writing a batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS workers (
                worker_id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workstations (
                station_id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            -- Events table: camera observations, append-only
            -- timestamp: RFC 3339 UTC, nanosecond precision, fixed width
            -- event_type: working | idle | absent | product_count
            -- count: set only for product_count
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                worker_id TEXT NOT NULL,
                station_id TEXT,
                event_type TEXT NOT NULL,
                confidence REAL DEFAULT 0.0,
                count INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_events_worker ON events(worker_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_station ON events(station_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_events_duplicate
                ON events(timestamp, worker_id, event_type);
            ",
        )?;
        Ok(())
    }

    /// Registers a worker. Returns `false` if the ID was already registered;
    /// the existing name is kept.
    pub fn register_worker(&mut self, worker_id: &WorkerId, name: &str) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO workers (worker_id, name) VALUES (?, ?)",
            params![worker_id.as_str(), name],
        )?;
        Ok(inserted > 0)
    }

    /// Registers a workstation. Returns `false` if the ID was already registered;
    /// the existing name is kept.
    pub fn register_workstation(
        &mut self,
        station_id: &StationId,
        name: &str,
    ) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO workstations (station_id, name) VALUES (?, ?)",
            params![station_id.as_str(), name],
        )?;
        Ok(inserted > 0)
    }

    /// Lists registered workers ordered by ID.
    pub fn list_workers(&self) -> Result<Vec<WorkerRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT worker_id, name FROM workers ORDER BY worker_id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut workers = Vec::new();
        for row in rows {
            let (id, name) = row?;
            let worker_id = WorkerId::new(id.clone()).map_err(|err| DbError::InvalidRow {
                table: "workers",
                row: id,
                message: err.to_string(),
            })?;
            workers.push(WorkerRecord { worker_id, name });
        }
        Ok(workers)
    }

    /// Lists registered workstations ordered by ID.
    pub fn list_workstations(&self) -> Result<Vec<WorkstationRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT station_id, name FROM workstations ORDER BY station_id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut stations = Vec::new();
        for row in rows {
            let (id, name) = row?;
            let station_id = StationId::new(id.clone()).map_err(|err| DbError::InvalidRow {
                table: "workstations",
                row: id,
                message: err.to_string(),
            })?;
            stations.push(WorkstationRecord { station_id, name });
        }
        Ok(stations)
    }

    /// Inserts a batch of events in one transaction, ignoring duplicates by
    /// `(timestamp, worker_id, event_type)`.
    pub fn insert_events(&mut self, events: &[Event]) -> Result<InsertOutcome, DbError> {
        if events.is_empty() {
            return Ok(InsertOutcome::default());
        }
        let tx = self.conn.transaction()?;
        let outcome = insert_events_tx(&tx, events)?;
        tx.commit()?;
        tracing::debug!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "stored event batch"
        );
        Ok(outcome)
    }

    /// Lists a worker's events in timeline order.
    ///
    /// Events sharing a timestamp come back in insertion order.
    pub fn events_for_worker(&self, worker_id: &WorkerId) -> Result<Vec<Event>, DbError> {
        self.query_events(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE worker_id = ? ORDER BY timestamp ASC, id ASC"
            ),
            worker_id.as_str(),
        )
    }

    /// Lists events observed at a workstation in timeline order, across all workers.
    ///
    /// Events sharing a timestamp come back in insertion order.
    pub fn events_for_station(&self, station_id: &StationId) -> Result<Vec<Event>, DbError> {
        self.query_events(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE station_id = ? ORDER BY timestamp ASC, id ASC"
            ),
            station_id.as_str(),
        )
    }

    /// Lists the most recent events, newest first.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<Event>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_events(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events ORDER BY timestamp DESC, id DESC LIMIT ?"
            ),
            limit,
        )
    }

    /// Counts stored events.
    pub fn event_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Returns the latest event timestamp, if any events exist.
    pub fn latest_event_at(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        let latest: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, timestamp FROM events ORDER BY timestamp DESC, id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        latest
            .map(|(row_id, timestamp)| parse_timestamp(&timestamp, row_id))
            .transpose()
    }

    /// Returns the evaluation cutoff shared by every timeline in a query:
    /// the latest event timestamp, or the current time if there are no events.
    pub fn global_cutoff(&self) -> Result<DateTime<Utc>, DbError> {
        Ok(self.latest_event_at()?.unwrap_or_else(Utc::now))
    }

    /// Removes all events and registrations.
    pub fn clear(&mut self) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        clear_tx(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Atomically replaces all data with the given registrations and events.
    pub fn replace_all(
        &mut self,
        workers: &[WorkerRecord],
        stations: &[WorkstationRecord],
        events: &[Event],
    ) -> Result<InsertOutcome, DbError> {
        let tx = self.conn.transaction()?;
        clear_tx(&tx)?;
        {
            let mut stmt = tx.prepare("INSERT INTO workers (worker_id, name) VALUES (?, ?)")?;
            for worker in workers {
                stmt.execute(params![worker.worker_id.as_str(), worker.name])?;
            }
            let mut stmt =
                tx.prepare("INSERT INTO workstations (station_id, name) VALUES (?, ?)")?;
            for station in stations {
                stmt.execute(params![station.station_id.as_str(), station.name])?;
            }
        }
        let outcome = insert_events_tx(&tx, events)?;
        tx.commit()?;
        Ok(outcome)
    }

    fn query_events(
        &self,
        sql: &str,
        param: impl rusqlite::ToSql,
    ) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([param], |row| {
            Ok(EventRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                worker_id: row.get(2)?,
                station_id: row.get(3)?,
                event_type: row.get(4)?,
                confidence: row.get(5)?,
                count: row.get(6)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }
}

/// An `events` row as stored, before domain validation.
struct EventRow {
    id: i64,
    timestamp: String,
    worker_id: String,
    station_id: Option<String>,
    event_type: String,
    confidence: Option<f64>,
    count: Option<i64>,
}

impl EventRow {
    fn into_event(self) -> Result<Event, DbError> {
        let row_id = self.id;
        let invalid = |message: String| DbError::InvalidRow {
            table: "events",
            row: row_id.to_string(),
            message,
        };

        let timestamp = parse_timestamp(&self.timestamp, row_id)?;
        let worker_id = WorkerId::new(self.worker_id).map_err(|err| invalid(err.to_string()))?;
        let station_id = self
            .station_id
            .filter(|id| !id.is_empty())
            .map(StationId::new)
            .transpose()
            .map_err(|err| invalid(err.to_string()))?;
        let kind: EventKind = self
            .event_type
            .parse()
            .map_err(|err: sf_core::UnknownEventKind| invalid(err.to_string()))?;
        let count = self
            .count
            .map(u64::try_from)
            .transpose()
            .map_err(|_| invalid("negative count".to_string()))?;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "confidence is written from an f32"
        )]
        let confidence = Confidence::clamped(self.confidence.unwrap_or_default() as f32);

        Ok(Event::new(timestamp, worker_id, kind, count)
            .map_err(|err| invalid(err.to_string()))?
            .with_station(station_id)
            .with_confidence(confidence))
    }
}

fn insert_events_tx(tx: &Transaction<'_>, events: &[Event]) -> Result<InsertOutcome, DbError> {
    let mut outcome = InsertOutcome::default();
    let mut stmt = tx.prepare(
        "
        INSERT OR IGNORE INTO events
        (timestamp, worker_id, station_id, event_type, confidence, count)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )?;
    for event in events {
        let count = event.count().map(i64::try_from).transpose().map_err(|_| {
            DbError::InvalidRow {
                table: "events",
                row: format!("{}@{}", event.worker_id(), event.timestamp()),
                message: "count exceeds storage range".to_string(),
            }
        })?;
        let changed = stmt.execute(params![
            format_timestamp(event.timestamp()),
            event.worker_id().as_str(),
            event.station_id().map(StationId::as_str),
            event.kind().as_str(),
            f64::from(event.confidence().value()),
            count,
        ])?;
        if changed > 0 {
            outcome.inserted += 1;
        } else {
            outcome.duplicates += 1;
        }
    }
    Ok(outcome)
}

fn clear_tx(tx: &Transaction<'_>) -> Result<(), DbError> {
    tx.execute_batch(
        "
        DELETE FROM events;
        DELETE FROM workers;
        DELETE FROM workstations;
        ",
    )?;
    Ok(())
}

fn parse_timestamp(timestamp: &str, row_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            row_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::TimeZone;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
    }

    fn worker(id: &str) -> WorkerId {
        WorkerId::new(id).unwrap()
    }

    fn station(id: &str) -> StationId {
        StationId::new(id).unwrap()
    }

    fn event(minutes: i64, worker_id: &str, station_id: &str, kind: EventKind) -> Event {
        let count = kind.policy().carries_count.then_some(10);
        Event::new(ts(minutes), worker(worker_id), kind, count)
            .unwrap()
            .with_station(Some(station(station_id)))
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(table_columns(&db.conn, "workers"), vec!["worker_id", "name"]);
        assert_eq!(
            table_columns(&db.conn, "workstations"),
            vec!["station_id", "name"]
        );
        assert_eq!(
            table_columns(&db.conn, "events"),
            vec![
                "id",
                "timestamp",
                "worker_id",
                "station_id",
                "event_type",
                "confidence",
                "count",
            ]
        );

        let event_indexes = index_names(&db.conn, "events");
        let expected: HashSet<String> = [
            "idx_events_worker",
            "idx_events_station",
            "idx_events_timestamp",
            "idx_events_duplicate",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert!(expected.is_subset(&event_indexes));
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    #[test]
    fn insert_events_counts_duplicates() {
        let mut db = Database::open_in_memory().unwrap();
        let original = event(0, "W1", "S1", EventKind::ProductionCount);
        // Same key, different location, confidence and count.
        let replay = Event::new(ts(0), worker("W1"), EventKind::ProductionCount, Some(99))
            .unwrap()
            .with_station(Some(station("S2")))
            .with_confidence(Confidence::new(0.4).unwrap());

        let outcome = db.insert_events(&[original, replay]).unwrap();

        assert_eq!(
            outcome,
            InsertOutcome {
                inserted: 1,
                duplicates: 1
            }
        );
        let stored = db.events_for_worker(&worker("W1")).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].count(), Some(10));
        assert_eq!(stored[0].station_id(), Some(&station("S1")));
    }

    #[test]
    fn duplicate_key_includes_kind_and_worker() {
        let mut db = Database::open_in_memory().unwrap();
        let outcome = db
            .insert_events(&[
                event(0, "W1", "S1", EventKind::Working),
                event(0, "W1", "S1", EventKind::Idle),
                event(0, "W2", "S1", EventKind::Working),
            ])
            .unwrap();

        assert_eq!(outcome.inserted, 3);
        assert_eq!(outcome.duplicates, 0);
    }

    #[test]
    fn same_instant_with_different_offset_is_duplicate() {
        let mut db = Database::open_in_memory().unwrap();
        let utc = event(0, "W1", "S1", EventKind::Working);
        let shifted = sf_core::validate_record(&serde_json::json!({
            "timestamp": "2026-01-15T10:00:00+02:00",
            "worker_id": "W1",
            "event_type": "working"
        }))
        .unwrap();

        let outcome = db.insert_events(&[utc, shifted]).unwrap();
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn sub_millisecond_instants_are_distinct() {
        let mut db = Database::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let later = Event::new(
            base + chrono::Duration::microseconds(900),
            worker("W1"),
            EventKind::Working,
            None,
        )
        .unwrap();
        let earlier = Event::new(
            base + chrono::Duration::microseconds(100),
            worker("W1"),
            EventKind::Working,
            None,
        )
        .unwrap();
        let next_milli = Event::new(
            base + chrono::Duration::milliseconds(1),
            worker("W1"),
            EventKind::Idle,
            None,
        )
        .unwrap();

        let outcome = db
            .insert_events(&[next_milli.clone(), later.clone(), earlier.clone()])
            .unwrap();

        assert_eq!(outcome.inserted, 3);
        assert_eq!(outcome.duplicates, 0);
        let stored = db.events_for_worker(&worker("W1")).unwrap();
        assert_eq!(stored, vec![earlier, later, next_milli.clone()]);
        assert_eq!(db.latest_event_at().unwrap(), Some(next_milli.timestamp()));
    }

    #[test]
    fn events_for_worker_are_chronological() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event(120, "W1", "S1", EventKind::Idle),
            event(0, "W1", "S1", EventKind::Working),
            event(60, "W2", "S2", EventKind::Working),
            event(60, "W1", "S1", EventKind::ProductionCount),
        ])
        .unwrap();

        let events = db.events_for_worker(&worker("W1")).unwrap();
        let kinds: Vec<_> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Working,
                EventKind::ProductionCount,
                EventKind::Idle
            ]
        );
    }

    #[test]
    fn identical_timestamps_keep_insertion_order() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event(0, "W1", "S1", EventKind::Idle),
            event(0, "W1", "S1", EventKind::Working),
        ])
        .unwrap();

        let kinds: Vec<_> = db
            .events_for_worker(&worker("W1"))
            .unwrap()
            .iter()
            .map(Event::kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::Idle, EventKind::Working]);
    }

    #[test]
    fn events_for_station_span_workers() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event(0, "W6", "S6", EventKind::Working),
            event(120, "W6", "S1", EventKind::Working),
            event(0, "W1", "S1", EventKind::Working),
            event(180, "W6", "S6", EventKind::Idle),
        ])
        .unwrap();

        let events = db.events_for_station(&station("S1")).unwrap();
        let workers: Vec<_> = events.iter().map(|e| e.worker_id().as_str()).collect();
        assert_eq!(workers, vec!["W1", "W6"]);
    }

    #[test]
    fn events_without_station_are_not_listed_by_station() {
        let mut db = Database::open_in_memory().unwrap();
        let roaming = Event::new(ts(0), worker("W1"), EventKind::Working, None).unwrap();
        db.insert_events(&[roaming]).unwrap();

        assert!(db.events_for_station(&station("S1")).unwrap().is_empty());
        assert_eq!(db.events_for_worker(&worker("W1")).unwrap().len(), 1);
    }

    #[test]
    fn global_cutoff_is_latest_event() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event(30, "W1", "S1", EventKind::Working),
            event(480, "W2", "S2", EventKind::Absent),
        ])
        .unwrap();

        assert_eq!(db.global_cutoff().unwrap(), ts(480));
    }

    #[test]
    fn global_cutoff_falls_back_to_now() {
        let db = Database::open_in_memory().unwrap();
        let before = Utc::now();
        let cutoff = db.global_cutoff().unwrap();

        assert!(db.latest_event_at().unwrap().is_none());
        assert!(cutoff >= before);
    }

    #[test]
    fn recent_events_are_newest_first() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event(0, "W1", "S1", EventKind::Working),
            event(60, "W1", "S1", EventKind::Idle),
            event(120, "W1", "S1", EventKind::Absent),
        ])
        .unwrap();

        let recent = db.recent_events(2).unwrap();
        let times: Vec<_> = recent.iter().map(Event::timestamp).collect();
        assert_eq!(times, vec![ts(120), ts(60)]);
        assert_eq!(db.event_count().unwrap(), 3);
    }

    #[test]
    fn registration_is_first_write_wins() {
        let mut db = Database::open_in_memory().unwrap();

        assert!(db.register_worker(&worker("W1"), "Lionel Messi").unwrap());
        assert!(!db.register_worker(&worker("W1"), "Someone Else").unwrap());
        assert!(db.register_workstation(&station("S1"), "Assembly Line A").unwrap());

        let workers = db.list_workers().unwrap();
        assert_eq!(
            workers,
            vec![WorkerRecord {
                worker_id: worker("W1"),
                name: "Lionel Messi".to_string()
            }]
        );
        assert_eq!(db.list_workstations().unwrap().len(), 1);
    }

    #[test]
    fn replace_all_clears_previous_data() {
        let mut db = Database::open_in_memory().unwrap();
        db.register_worker(&worker("OLD"), "Old").unwrap();
        db.insert_events(&[event(0, "OLD", "S9", EventKind::Working)])
            .unwrap();

        let outcome = db
            .replace_all(
                &[WorkerRecord {
                    worker_id: worker("W1"),
                    name: "One".to_string(),
                }],
                &[WorkstationRecord {
                    station_id: station("S1"),
                    name: "Line".to_string(),
                }],
                &[event(0, "W1", "S1", EventKind::Working)],
            )
            .unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(db.list_workers().unwrap().len(), 1);
        assert_eq!(db.event_count().unwrap(), 1);
        assert!(db.events_for_worker(&worker("OLD")).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let mut db = Database::open_in_memory().unwrap();
        db.register_worker(&worker("W1"), "One").unwrap();
        db.register_workstation(&station("S1"), "Line").unwrap();
        db.insert_events(&[event(0, "W1", "S1", EventKind::Working)])
            .unwrap();

        db.clear().unwrap();

        assert_eq!(db.event_count().unwrap(), 0);
        assert!(db.list_workers().unwrap().is_empty());
        assert!(db.list_workstations().unwrap().is_empty());
        // The uniqueness key is free again.
        let outcome = db
            .insert_events(&[event(0, "W1", "S1", EventKind::Working)])
            .unwrap();
        assert_eq!(outcome.inserted, 1);
    }

    #[test]
    fn stored_events_roundtrip_fields() {
        let mut db = Database::open_in_memory().unwrap();
        let original = Event::new(ts(5), worker("W3"), EventKind::ProductionCount, Some(55))
            .unwrap()
            .with_station(Some(station("S3")))
            .with_confidence(Confidence::new(0.5).unwrap());
        db.insert_events(std::slice::from_ref(&original)).unwrap();

        let stored = db.events_for_worker(&worker("W3")).unwrap();
        assert_eq!(stored, vec![original]);
    }

    #[test]
    fn corrupt_row_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO events (timestamp, worker_id, event_type) VALUES (?, ?, ?)",
                params!["2026-01-15T08:00:00.000000000Z", "W1", "dancing"],
            )
            .unwrap();

        let err = db.events_for_worker(&worker("W1")).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { table: "events", .. }));
    }

    #[test]
    fn concurrent_duplicate_inserts_store_one_row() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sf.db");
        Database::open(&path).unwrap();

        let outcomes: Vec<InsertOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let path = path.clone();
                    scope.spawn(move || {
                        let mut db = Database::open(&path).unwrap();
                        db.insert_events(&[event(0, "W1", "S1", EventKind::Working)])
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let inserted: usize = outcomes.iter().map(|o| o.inserted).sum();
        let duplicates: usize = outcomes.iter().map(|o| o.duplicates).sum();
        assert_eq!(inserted, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(Database::open(&path).unwrap().event_count().unwrap(), 1);
    }
}
