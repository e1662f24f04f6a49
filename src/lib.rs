// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # mc2bq
//!
//! Exports Migration Center assets, groups and preference sets into
//! BigQuery tables, or into JSON lines files on an object store.
//!
//! ## Features
//!
//! - **Schema Driven**: objects are shaped by BigQuery table schemas, with
//!   open-ended maps stored as key-sorted `{key, value}` lists
//! - **Streaming**: records are serialized while they are uploaded, never
//!   held in memory as a whole
//! - **Resilient Listing**: transient API failures are retried with a
//!   jittered exponential backoff
//! - **Concurrent Tables**: every table is exported at once, and the first
//!   failure stops the others
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mc2bq::export::{Exporter, ExportParams};
//! use mc2bq::schema::ExporterSchema;
//!
//! let params = ExportParams::new("my-project", "migration_center", ExporterSchema::embedded()?)
//!     .with_table_prefix("mc_");
//! let summary = Exporter::new(source, warehouse).export(&params).await?;
//! println!("{} bytes transferred", summary.bytes_transferred);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Exporter (export)                        │
//! │        one task per table, shared cancellation, progress         │
//! └──────────────────────────────────────────────────────────────────┘
//!          │                        │                       │
//! ┌────────┴────────┐   ┌───────────┴──────────┐   ┌────────┴────────┐
//! │     listing     │   │      pagination      │   │    warehouse    │
//! ├─────────────────┤   ├──────────────────────┤   ├─────────────────┤
//! │ Migration Center│──▶│ ObjectIterator       │──▶│ BigQuery        │
//! │ REST pages      │   │ ObjectReader (bytes) │   │ Object stores   │
//! └─────────────────┘   └──────────────────────┘   └─────────────────┘
//!          │                        │                       │
//!   http + auth              schema + backoff          http + auth
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for mc2bq
pub mod error;

/// Common types and type aliases
pub mod types;

/// Backoff schedules and retry loops
pub mod backoff;

/// Table schemas and the object normalizer
pub mod schema;

/// Migration Center source objects
pub mod model;

/// Paginated listings as object and byte streams
pub mod pagination;

/// Authentication implementations
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// Migration Center listing client
pub mod listing;

/// Export destinations
pub mod warehouse;

/// Export orchestration
pub mod export;

/// Export configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use export::{ExportParams, ExportSummary, Exporter};
pub use schema::ExporterSchema;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
