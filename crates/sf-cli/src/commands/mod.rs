//! CLI subcommand implementations.

pub mod events;
pub mod ingest;
pub mod metrics;
pub mod registry;
pub mod seed;
pub mod status;
