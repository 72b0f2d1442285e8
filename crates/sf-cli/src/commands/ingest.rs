//! Ingest command for storing camera events.
//!
//! Reads one JSON document from a file or stdin. Records are validated one at a
//! time; bad records are reported back with their batch index while the rest
//! are stored.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use sf_core::validate::split_document;
use sf_core::validate_batch;
use sf_db::Database;

/// Summary printed after an ingest.
#[derive(Debug, Serialize)]
pub struct IngestSummary {
    pub status: &'static str,
    pub inserted: usize,
    pub duplicates: usize,
    /// `None` when every record validated.
    pub errors: Option<Vec<String>>,
}

/// Validates and stores every record in `document`.
pub fn ingest_document(db: &mut Database, document: Value) -> Result<IngestSummary> {
    let records = split_document(document);
    let batch = validate_batch(&records);
    let outcome = db
        .insert_events(&batch.events)
        .context("failed to store events")?;

    tracing::info!(
        received = records.len(),
        inserted = outcome.inserted,
        duplicates = outcome.duplicates,
        rejected = batch.rejected.len(),
        "ingested events"
    );

    let errors: Vec<String> = batch
        .rejected
        .iter()
        .map(|rejected| format!("record {}: {}", rejected.index, rejected.error))
        .collect();

    Ok(IngestSummary {
        status: "success",
        inserted: outcome.inserted,
        duplicates: outcome.duplicates,
        errors: (!errors.is_empty()).then_some(errors),
    })
}

/// Runs the ingest command, reading the document from `reader`.
pub fn run<R: Read, W: Write>(writer: &mut W, db: &mut Database, reader: R) -> Result<()> {
    let document: Value =
        serde_json::from_reader(reader).context("failed to parse event document as JSON")?;
    let summary = ingest_document(db, document)?;
    writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    Ok(())
}
