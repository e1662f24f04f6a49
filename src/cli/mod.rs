//! CLI module
//!
//! Command-line interface of the exporter.
//!
//! # Commands
//!
//! - `export` - Export Migration Center data to BigQuery or an object store
//! - `dump-schema` - Print the embedded table schemas

mod commands;
mod runner;

pub use commands::{Cli, Commands, ExportArgs};
pub use runner::Runner;
