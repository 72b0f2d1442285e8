//! Status command for showing what the store holds.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::SecondsFormat;
use sf_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    writeln!(writer, "Shopfloor status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Workers: {}", db.list_workers()?.len())?;
    writeln!(writer, "Workstations: {}", db.list_workstations()?.len())?;

    match db.latest_event_at()? {
        Some(latest) => {
            writeln!(writer, "Events: {}", db.event_count()?)?;
            writeln!(
                writer,
                "Latest event: {}",
                latest.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }
        None => writeln!(writer, "No events recorded.")?,
    }

    Ok(())
}
