//! Warehouse types and traits

use crate::error::{Error, Result};
use crate::pagination::RecordStream;
use crate::schema::Schema;
use crate::types::WriteDisposition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// A dataset in a project
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    pub project_id: String,
    pub dataset_id: String,
}

impl DatasetRef {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
        }
    }

    /// Reference a table of this dataset
    pub fn table(&self, table_id: impl Into<String>) -> TableRef {
        TableRef {
            project_id: self.project_id.clone(),
            dataset_id: self.dataset_id.clone(),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project_id, self.dataset_id)
    }
}

/// A table in a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// A bulk load of one table
pub struct LoadRequest {
    /// Destination table
    pub table: TableRef,
    /// Schema the records conform to
    pub schema: Schema,
    /// Line delimited JSON records
    pub source: RecordStream,
    /// What to do with existing data
    pub write_disposition: WriteDisposition,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("table", &self.table)
            .field("fields", &self.schema.len())
            .field("write_disposition", &self.write_disposition)
            .finish_non_exhaustive()
    }
}

/// State of a load job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Done,
}

/// A structured error reported by a load job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobError {
    pub reason: String,
    pub location: String,
    pub message: String,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.location.is_empty() {
            write!(f, " (location {})", self.location)?;
        }
        if !self.reason.is_empty() {
            write!(f, " [{}]", self.reason)?;
        }
        Ok(())
    }
}

/// Status of a load job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatus {
    pub state: JobState,
    /// Set when the job failed
    pub error_result: Option<JobError>,
    /// Every error encountered, possibly non-fatal
    pub errors: Vec<JobError>,
}

impl JobStatus {
    /// Status of a job that finished without errors
    pub fn done() -> Self {
        Self {
            state: JobState::Done,
            ..Self::default()
        }
    }

    /// Status of a job that finished with an error
    pub fn failed(error: JobError) -> Self {
        Self {
            state: JobState::Done,
            error_result: Some(error),
            errors: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == JobState::Done
    }

    /// Turn a failed status into an error listing every sub-error
    pub fn into_result(self, table: &str) -> Result<()> {
        let Some(error_result) = self.error_result else {
            return Ok(());
        };

        if self.errors.is_empty() {
            return Err(Error::load(table, error_result.to_string()));
        }

        let mut message = String::from("encountered errors during export:");
        for error in &self.errors {
            message.push_str("\n\t");
            message.push_str(&error.to_string());
        }
        Err(Error::load(table, message))
    }
}

/// Destination of an export: datasets, tables and bulk loads.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Create the dataset unless it already exists
    async fn create_dataset_if_absent(&self, dataset: &DatasetRef) -> Result<()>;

    /// Check whether a table exists. A missing table is not an error.
    async fn table_exists(&self, table: &TableRef) -> Result<bool>;

    /// Delete a table. Deleting a missing table succeeds.
    async fn delete_table(&self, table: &TableRef) -> Result<()>;

    /// Start loading a stream of records into a table
    async fn start_load(&self, request: LoadRequest) -> Result<Box<dyn LoadJob>>;
}

/// A running load
#[async_trait]
pub trait LoadJob: Send {
    /// Job identifier
    fn id(&self) -> &str;

    /// Wait until the job is done and return its final status
    async fn wait(&mut self, cancel: &CancellationToken) -> Result<JobStatus>;
}

/// A load that was already complete when it was started
#[derive(Debug, Clone)]
pub struct CompletedJob {
    id: String,
    status: JobStatus,
}

impl CompletedJob {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

#[async_trait]
impl LoadJob for CompletedJob {
    fn id(&self) -> &str {
        &self.id
    }

    async fn wait(&mut self, _cancel: &CancellationToken) -> Result<JobStatus> {
        Ok(self.status.clone())
    }
}
