//! Export module
//!
//! Runs an export: one concurrent task per record kind, each streaming a
//! listing through the normalizer into a bulk load.
//!
//! # Overview
//!
//! [`Exporter::export`] creates the dataset, refuses to touch existing
//! tables unless forced, then starts every table at once. The first failing
//! table cancels its siblings and its error is the result of the export.

mod progress;
mod types;

pub use progress::{format_bytes, spawn_progress_reporter};
pub use types::{
    ExportParams, ExportSummary, TableState, TableSummary, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_REGION,
};

use crate::error::{Error, Result, ResultExt};
use crate::listing::MigrationCenter;
use crate::pagination::{ObjectIterator, ObjectReader, PageFetcher, ReadProgress, RecordStream};
use crate::schema::{RecordSerializer, Schema, SourceObject};
use crate::types::{TableKind, WriteDisposition};
use crate::warehouse::{LoadRequest, TableRef, Warehouse};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Exports Migration Center data into a warehouse
pub struct Exporter {
    source: Arc<dyn MigrationCenter>,
    warehouse: Arc<dyn Warehouse>,
}

impl Exporter {
    pub fn new(source: Arc<dyn MigrationCenter>, warehouse: Arc<dyn Warehouse>) -> Self {
        Self { source, warehouse }
    }

    /// Export every record kind that has a table schema
    pub async fn export(&self, params: &ExportParams) -> Result<ExportSummary> {
        let dataset = params.dataset();
        info!(%dataset, "creating dataset");
        self.warehouse
            .create_dataset_if_absent(&dataset)
            .await
            .context("create dataset")?;

        let kinds: Vec<TableKind> = TableKind::ALL
            .into_iter()
            .filter(|&kind| {
                let present = !params.schema.table(kind).is_empty();
                if !present {
                    warn!(table = %kind, "no schema for table, skipping");
                }
                present
            })
            .collect();

        // Nothing may be written while any destination is in the way
        if !params.force {
            for &kind in &kinds {
                let table = dataset.table(params.table_name(kind));
                if self.warehouse.table_exists(&table).await? {
                    return Err(Error::TableExists {
                        table: table.to_string(),
                    });
                }
            }
        }

        let asset_count = self
            .source
            .asset_count()
            .await
            .context("fetch asset count")?;

        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();
        for kind in kinds {
            let total = match kind {
                TableKind::Assets => u64::try_from(asset_count).unwrap_or(0),
                _ => 0,
            };
            let task = self.table_export(kind, params, total, &cancel);
            tasks.spawn(task.run());
        }

        let summary = collect_tables(tasks, &cancel).await?;
        info!(
            tables = summary.tables.len(),
            records = summary.records(),
            bytes = %format_bytes(summary.bytes_transferred),
            "export complete"
        );
        Ok(summary)
    }

    fn table_export(
        &self,
        kind: TableKind,
        params: &ExportParams,
        total: u64,
        cancel: &CancellationToken,
    ) -> TableExport {
        let (source, progress) = match kind {
            TableKind::Assets => record_stream(self.source.assets(), kind, params, cancel),
            TableKind::Groups => record_stream(self.source.groups(), kind, params, cancel),
            TableKind::PreferenceSets => {
                record_stream(self.source.preference_sets(), kind, params, cancel)
            }
        };

        TableExport {
            kind,
            table: params.dataset().table(params.table_name(kind)),
            schema: params.schema.table(kind).clone(),
            source,
            progress,
            total,
            force: params.force,
            progress_interval: params.progress_interval,
            warehouse: Arc::clone(&self.warehouse),
            cancel: cancel.clone(),
        }
    }
}

/// Build the serialized record stream of one listing
fn record_stream<T: SourceObject + 'static>(
    fetcher: Box<dyn PageFetcher<T>>,
    kind: TableKind,
    params: &ExportParams,
    cancel: &CancellationToken,
) -> (RecordStream, Arc<ReadProgress>) {
    let objects = ObjectIterator::new(fetcher)
        .with_backoff(params.backoff)
        .with_cancellation(cancel.clone());
    let serializer = RecordSerializer::new(kind.root_name(), params.schema.table(kind).clone());
    let reader = ObjectReader::new(objects, serializer);
    let progress = reader.progress();
    (reader.into_stream(), progress)
}

/// Wait for every table, keeping the first failure.
///
/// The first failure cancels the shared token. Siblings then stop at their
/// next suspension point and their cancellation errors are dropped.
async fn collect_tables(
    mut tasks: JoinSet<Result<TableSummary>>,
    cancel: &CancellationToken,
) -> Result<ExportSummary> {
    let mut tables = Vec::new();
    let mut first_error: Option<Error> = None;

    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap_or_else(|join_err| {
            Err(Error::Other(format!("export task failed: {join_err}")))
        });

        match result {
            Ok(table) if first_error.is_none() => tables.push(table),
            Ok(_) => {}
            Err(e) if first_error.is_none() => {
                error!(error = %e, "table export failed");
                cancel.cancel();
                first_error = Some(e);
            }
            Err(e) => debug!(error = %e, "table export stopped"),
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(ExportSummary::new(tables)),
    }
}

/// Everything one table task owns
struct TableExport {
    kind: TableKind,
    table: TableRef,
    schema: Schema,
    source: RecordStream,
    progress: Arc<ReadProgress>,
    total: u64,
    force: bool,
    progress_interval: Duration,
    warehouse: Arc<dyn Warehouse>,
    cancel: CancellationToken,
}

impl TableExport {
    async fn run(self) -> Result<TableSummary> {
        let table_id = self.table.table_id.clone();
        let kind = self.kind;
        let result = self.load().await;
        match &result {
            Ok(_) => debug!(table = %table_id, state = %TableState::Completed, "table state"),
            Err(_) => debug!(table = %table_id, state = %TableState::Failed, "table state"),
        }
        result.map_err(|e| e.in_table(kind.table_suffix()))
    }

    async fn load(self) -> Result<TableSummary> {
        let table = self.table.to_string();
        let cancel = &self.cancel;
        debug!(%table, state = %TableState::Pending, "table state");

        if self.force {
            or_cancelled(cancel, self.warehouse.delete_table(&self.table)).await?;
        }

        info!(%table, "exporting data to table");
        debug!(%table, state = %TableState::Streaming, "table state");

        let stop_reporting = CancellationToken::new();
        let reporter = spawn_progress_reporter(
            table.clone(),
            Arc::clone(&self.progress),
            self.total,
            self.progress_interval,
            stop_reporting.clone(),
        );
        let _stop_on_exit = stop_reporting.clone().drop_guard();

        let request = LoadRequest {
            table: self.table.clone(),
            schema: self.schema,
            source: self.source,
            write_disposition: WriteDisposition::WriteTruncate,
        };
        let mut job = or_cancelled(cancel, self.warehouse.start_load(request)).await?;
        debug!(%table, job_id = job.id(), "waiting for load job");
        let status = job.wait(cancel).await?;

        stop_reporting.cancel();
        // The reporter only logs, its outcome does not matter
        let _ = reporter.await;

        status.into_result(&table)?;

        // A sibling failed while this load was finishing
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let records = self.progress.objects_read();
        let bytes = self.progress.bytes_read();
        info!(%table, records, bytes = %format_bytes(bytes), "table export complete");

        Ok(TableSummary {
            kind: self.kind,
            table,
            records,
            bytes,
        })
    }
}

/// Run `fut` unless `cancel` fires first
async fn or_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
