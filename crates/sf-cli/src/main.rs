use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sf_cli::commands::{events, ingest, metrics, registry, seed, status};
use sf_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(sf_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = sf_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Ingest { file } => match file {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                ingest::run(&mut out, &mut db, BufReader::new(file))?;
            }
            None => ingest::run(&mut out, &mut db, io::stdin().lock())?,
        },
        Commands::Events { limit, json } => events::run(&mut out, &db, *limit, *json)?,
        Commands::Workers { json } => registry::list_workers(&mut out, &db, *json)?,
        Commands::Workstations { json } => registry::list_workstations(&mut out, &db, *json)?,
        Commands::Register(target) => registry::register(&mut out, &mut db, target)?,
        Commands::Metrics { scope, json } => metrics::run(&mut out, &db, *scope, *json)?,
        Commands::Seed => seed::run(&mut out, &mut db)?,
        Commands::Status => status::run(&mut out, &db, &config.database_path)?,
    }

    Ok(())
}
