// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]

//! mc2bq CLI
//!
//! Command-line interface for exporting Migration Center data

use anyhow::Context;
use clap::Parser;
use mc2bq::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await.context("error exporting data") {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
