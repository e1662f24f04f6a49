//! Export parameters and results

use crate::backoff::Backoff;
use crate::schema::ExporterSchema;
use crate::types::TableKind;
use crate::warehouse::DatasetRef;
use std::fmt;
use std::time::Duration;

/// Default interval between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Default Migration Center region
pub const DEFAULT_REGION: &str = "us-central1";

/// What to export and where
#[derive(Debug, Clone)]
pub struct ExportParams {
    /// Project holding the Migration Center data
    pub project_id: String,
    /// Migration Center region
    pub region: String,
    /// Project of the destination dataset, the source project when empty
    pub target_project_id: String,
    /// Destination dataset
    pub dataset_id: String,
    /// Prepended to every destination table name
    pub table_prefix: String,
    /// Replace existing tables instead of failing
    pub force: bool,
    /// Table schemas
    pub schema: ExporterSchema,
    /// Interval between progress reports
    pub progress_interval: Duration,
    /// Backoff between failed page fetches
    pub backoff: Backoff,
}

impl ExportParams {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        schema: ExporterSchema,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: DEFAULT_REGION.to_string(),
            target_project_id: String::new(),
            dataset_id: dataset_id.into(),
            table_prefix: String::new(),
            force: false,
            schema,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            backoff: Backoff::API,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_target_project(mut self, project_id: impl Into<String>) -> Self {
        self.target_project_id = project_id.into();
        self
    }

    #[must_use]
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Project the destination dataset lives in
    pub fn target_project(&self) -> &str {
        if self.target_project_id.is_empty() {
            &self.project_id
        } else {
            &self.target_project_id
        }
    }

    /// Destination dataset
    pub fn dataset(&self) -> DatasetRef {
        DatasetRef::new(self.target_project(), &self.dataset_id)
    }

    /// Destination table name of a record kind
    pub fn table_name(&self, kind: TableKind) -> String {
        format!("{}{}", self.table_prefix, kind.table_suffix())
    }
}

/// Lifecycle of the export of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Pending,
    Streaming,
    Completed,
    Failed,
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableState::Pending => "pending",
            TableState::Streaming => "streaming",
            TableState::Completed => "completed",
            TableState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of exporting one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub kind: TableKind,
    /// Fully qualified destination table
    pub table: String,
    pub records: u64,
    pub bytes: u64,
}

/// Result of a whole export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Exported tables, in record kind order
    pub tables: Vec<TableSummary>,
    /// Bytes sent across every table
    pub bytes_transferred: u64,
}

impl ExportSummary {
    pub(crate) fn new(mut tables: Vec<TableSummary>) -> Self {
        tables.sort_by_key(|table| table.kind);
        let bytes_transferred = tables.iter().map(|table| table.bytes).sum();
        Self {
            tables,
            bytes_transferred,
        }
    }

    /// Summary of the table holding `kind`, if it was exported
    pub fn table(&self, kind: TableKind) -> Option<&TableSummary> {
        self.tables.iter().find(|table| table.kind == kind)
    }

    /// Records exported across every table
    pub fn records(&self) -> u64 {
        self.tables.iter().map(|table| table.records).sum()
    }
}
