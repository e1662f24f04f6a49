//! CLI commands and argument parsing

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Export Migration Center data to BigQuery
#[derive(Parser, Debug)]
#[command(name = "mc2bq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "MC2BQ_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export assets, groups and preference sets
    Export(ExportArgs),

    /// Print the embedded table schemas
    DumpSchema,
}

/// Arguments of `export`. Anything given here overrides the config file.
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct ExportArgs {
    /// Project holding the Migration Center data
    #[arg(env = "MC2BQ_PROJECT")]
    pub project: Option<String>,

    /// Destination dataset
    #[arg(env = "MC2BQ_DATASET")]
    pub dataset: Option<String>,

    /// Prepended to every table name
    #[arg(env = "MC2BQ_TABLE_PREFIX")]
    pub table_prefix: Option<String>,

    /// Migration Center region
    #[arg(long, env = "MC2BQ_REGION")]
    pub region: Option<String>,

    /// Project of the destination dataset (defaults to the source project)
    #[arg(long, env = "MC2BQ_TARGET_PROJECT")]
    pub target_project: Option<String>,

    /// Overwrite existing tables. Any value of MC2BQ_FORCE other than a
    /// falsey one (empty, 0, false, no, off) enables it
    #[arg(long, env = "MC2BQ_FORCE", value_parser = FalseyValueParser::new())]
    pub force: bool,

    /// Table schema definition (JSON), the embedded one by default
    #[arg(long, env = "MC2BQ_SCHEMA_PATH")]
    pub schema_path: Option<PathBuf>,

    /// Write to an object store instead of BigQuery.
    /// Supports: /path, file:///path, s3://bucket/path, r2://bucket/path,
    /// gs://bucket/path, az://container/path
    #[arg(long, env = "MC2BQ_DESTINATION")]
    pub destination: Option<String>,

    /// OAuth2 access token used instead of a service account key
    #[arg(long, env = "MC2BQ_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Service account key file
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials_file: Option<PathBuf>,
}
