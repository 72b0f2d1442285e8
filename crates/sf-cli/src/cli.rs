//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Worker productivity metrics from factory camera events.
///
/// Ingests worker state and production events, then derives utilization and
/// throughput for workers, workstations and the whole facility.
#[derive(Debug, Parser)]
#[command(name = "sf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest camera events from a JSON document (one object or an array).
    Ingest {
        /// Read from this file instead of stdin.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the most recent events, newest first.
    Events {
        /// Maximum number of events to show.
        #[arg(short = 'n', long, default_value_t = 100)]
        limit: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List registered workers.
    Workers {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List registered workstations.
    Workstations {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Register a worker or workstation.
    #[command(subcommand)]
    Register(RegisterTarget),

    /// Compute productivity metrics.
    Metrics {
        /// Which entities to report on.
        #[arg(value_enum)]
        scope: MetricsScope,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replace all data with the sample facility.
    Seed,

    /// Show database status.
    Status,
}

/// Entities that can be registered.
#[derive(Debug, Subcommand)]
pub enum RegisterTarget {
    /// Register a worker.
    Worker {
        /// Worker ID (e.g., W1).
        id: String,
        /// Display name.
        name: String,
    },

    /// Register a workstation.
    Workstation {
        /// Workstation ID (e.g., S1).
        id: String,
        /// Display name.
        name: String,
    },
}

/// Metrics report scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricsScope {
    Workers,
    Workstations,
    Factory,
}
