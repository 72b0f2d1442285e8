//! Events command for inspecting the most recent stored events.

use std::io::Write;

use anyhow::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use sf_core::Event;
use sf_db::Database;

#[derive(Serialize)]
struct EventsJson<'a> {
    events: &'a [Event],
    count: usize,
}

/// Runs the events command, newest first.
pub fn run<W: Write>(writer: &mut W, db: &Database, limit: usize, json: bool) -> Result<()> {
    let events = db.recent_events(limit)?;

    if json {
        let output = EventsJson {
            events: &events,
            count: events.len(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    for event in &events {
        let station = event.station_id().map_or("-", |id| id.as_str());
        let count = event
            .count()
            .map(|count| format!("  x{count}"))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}  {:<6} {:<6} {:<14} {:.2}{count}",
            event.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
            event.worker_id().as_str(),
            station,
            event.kind().as_str(),
            event.confidence().value(),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use serde_json::json;

    use crate::commands::ingest::ingest_document;

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        ingest_document(
            &mut db,
            json!([
                {"timestamp": "2026-01-15T08:00:00Z", "worker_id": "W1", "workstation_id": "S1", "event_type": "working", "confidence": 0.95},
                {"timestamp": "2026-01-15T10:00:00Z", "worker_id": "W1", "workstation_id": "S1", "event_type": "product_count", "confidence": 0.5, "count": 25},
                {"timestamp": "2026-01-15T10:30:00Z", "worker_id": "W2", "event_type": "idle", "confidence": 0.25}
            ]),
        )
        .unwrap();
        db
    }

    #[test]
    fn events_human_output_is_newest_first() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, 100, false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2026-01-15T10:30:00Z  W2     -      idle           0.25
        2026-01-15T10:00:00Z  W1     S1     product_count  0.50  x25
        2026-01-15T08:00:00Z  W1     S1     working        0.95
        ");
    }

    #[test]
    fn events_json_respects_limit() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, 1, true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["events"][0]["worker_id"], "W2");
        assert_eq!(value["events"][0]["event_type"], "idle");
        assert!(value["events"][0].get("station_id").is_none());
    }

    #[test]
    fn events_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, 100, false).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "No events recorded.\n");
    }
}
