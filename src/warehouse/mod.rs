//! Warehouse module
//!
//! The destination side of an export.
//!
//! # Overview
//!
//! [`Warehouse`] manages datasets and tables and starts bulk loads fed by a
//! [`RecordStream`](crate::pagination::RecordStream). A load runs as a
//! [`LoadJob`] whose final [`JobStatus`] lists any errors.
//!
//! Two implementations are provided:
//! - [`BigQueryWarehouse`]: BigQuery REST API with resumable uploads
//! - [`ObjectStoreWarehouse`]: JSON lines files in a local directory or a
//!   cloud bucket

mod bigquery;
mod storage;
mod types;

pub use bigquery::{
    BigQueryJob, BigQueryWarehouse, CHUNK_ALIGNMENT, DEFAULT_CHUNK_SIZE, DEFAULT_ENDPOINT,
    DEFAULT_POLL_INTERVAL,
};
pub use storage::{ObjectStoreWarehouse, DATA_FILE, SCHEMA_FILE};
pub use types::{
    CompletedJob, DatasetRef, JobError, JobState, JobStatus, LoadJob, LoadRequest, TableRef,
    Warehouse,
};
