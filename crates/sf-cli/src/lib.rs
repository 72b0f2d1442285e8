//! Shopfloor CLI library.
//!
//! This crate provides the CLI interface for the shopfloor metrics engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, MetricsScope, RegisterTarget};
pub use config::Config;
