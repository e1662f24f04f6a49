//! BigQuery REST implementation
//!
//! Loads go through a resumable upload: the load job configuration opens an
//! upload session and the records are then sent in chunks. Every chunk
//! except the last is a multiple of 256 KiB, as the upload protocol
//! requires. The final chunk creates the job, which is then polled until it
//! is done.

use super::types::{DatasetRef, JobStatus, LoadJob, LoadRequest, TableRef, Warehouse};
use crate::backoff::{retry_until, Attempt, Backoff};
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::WriteDisposition;
use crate::http::{api_error, HttpClient, RequestConfig};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use reqwest::header::LOCATION;
use reqwest::{Method, Response};
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default BigQuery endpoint
pub const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";

/// Granularity of resumable upload chunks
pub const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Default upload chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 32 * CHUNK_ALIGNMENT;

/// Default interval between job status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Status code of an accepted, incomplete upload chunk
const RESUME_INCOMPLETE: u16 = 308;

/// BigQuery over its REST API.
///
/// The wrapped [`HttpClient`] must have the API endpoint as its base URL.
#[derive(Debug, Clone)]
pub struct BigQueryWarehouse {
    http: HttpClient,
    chunk_size: usize,
    poll_interval: Duration,
}

impl BigQueryWarehouse {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            chunk_size: DEFAULT_CHUNK_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the upload chunk size, rounded up to a multiple of 256 KiB
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1).div_ceil(CHUNK_ALIGNMENT) * CHUNK_ALIGNMENT;
        self
    }

    /// Set the interval between job status polls
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn table_url(table: &TableRef) -> String {
        format!(
            "bigquery/v2/projects/{}/datasets/{}/tables/{}",
            table.project_id, table.dataset_id, table.table_id
        )
    }

    /// Open a resumable upload session for a load job
    async fn open_upload(
        &self,
        table: &TableRef,
        schema: &Schema,
        write_disposition: WriteDisposition,
        job_id: &str,
    ) -> Result<String> {
        let body = serde_json::json!({
            "jobReference": {
                "projectId": table.project_id,
                "jobId": job_id,
            },
            "configuration": {
                "load": {
                    "destinationTable": table,
                    "schema": {"fields": schema},
                    "sourceFormat": "NEWLINE_DELIMITED_JSON",
                    "writeDisposition": write_disposition,
                }
            }
        });

        let url = format!("upload/bigquery/v2/projects/{}/jobs", table.project_id);
        let config = RequestConfig::new()
            .query("uploadType", "resumable")
            .header("X-Upload-Content-Type", "application/octet-stream")
            .json(body);

        let response = self.http.request(Method::POST, &url, config).await?;
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| Error::load(table.to_string(), "upload session has no location"))
    }

    /// Send one chunk of the upload.
    ///
    /// `total` is only known, and only set, for the final chunk.
    async fn put_chunk(
        &self,
        session: &str,
        chunk: Bytes,
        offset: u64,
        total: Option<u64>,
    ) -> Result<Response> {
        let len = chunk.len() as u64;
        let range = match total {
            Some(total) if len == 0 => format!("bytes */{total}"),
            Some(total) => format!("bytes {offset}-{}/{total}", offset + len - 1),
            None => format!("bytes {offset}-{}/*", offset + len - 1),
        };
        debug!(%range, "uploading chunk");

        let config = RequestConfig::new()
            .header("Content-Range", range)
            .header("Content-Type", "application/octet-stream")
            .bytes(chunk);
        let response = self.http.execute(Method::PUT, session, config).await?;

        let status = response.status();
        match total {
            None if status.as_u16() == RESUME_INCOMPLETE => Ok(response),
            None if status.is_success() => Err(Error::Other(
                "upload session finished before the last chunk".into(),
            )),
            Some(_) if status.is_success() => Ok(response),
            _ => Err(api_error(response).await),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    job_reference: Option<JobReference>,
    #[serde(default)]
    status: JobStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn create_dataset_if_absent(&self, dataset: &DatasetRef) -> Result<()> {
        let url = format!("bigquery/v2/projects/{}/datasets", dataset.project_id);
        let body = serde_json::json!({
            "datasetReference": {
                "projectId": dataset.project_id,
                "datasetId": dataset.dataset_id,
            }
        });

        match self.http.request(Method::POST, &url, RequestConfig::new().json(body)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_status(409) => {
                debug!(%dataset, "dataset already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn table_exists(&self, table: &TableRef) -> Result<bool> {
        let url = Self::table_url(table);
        match self.http.request(Method::GET, &url, RequestConfig::new()).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_status(404) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete_table(&self, table: &TableRef) -> Result<()> {
        let url = Self::table_url(table);
        match self.http.request(Method::DELETE, &url, RequestConfig::new()).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_status(404) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn start_load(&self, request: LoadRequest) -> Result<Box<dyn LoadJob>> {
        // The record stream is not Sync, so no borrow of the request may
        // live across an await
        let LoadRequest {
            table,
            schema,
            mut source,
            write_disposition,
        } = request;

        let job_id = format!("mc2bq_{}_{:016x}", table.table_id, rand::random::<u64>());
        let session = self
            .open_upload(&table, &schema, write_disposition, &job_id)
            .await?;
        debug!(%table, %job_id, "upload session opened");

        let mut buffer = BytesMut::new();
        let mut offset = 0u64;
        while let Some(chunk) = source.try_next().await? {
            buffer.extend_from_slice(&chunk);
            // Hold back at least one byte so the final chunk is never empty
            while buffer.len() > self.chunk_size {
                let part = buffer.split_to(self.chunk_size).freeze();
                let len = part.len() as u64;
                self.put_chunk(&session, part, offset, None).await?;
                offset += len;
            }
        }

        let rest = buffer.freeze();
        let total = offset + rest.len() as u64;
        let response = self.put_chunk(&session, rest, offset, Some(total)).await?;
        let job: JobResource = response.json().await.map_err(Error::Http)?;

        let (job_id, location) = match job.job_reference {
            Some(reference) => (reference.job_id, reference.location),
            None => (job_id, None),
        };
        info!(%table, %job_id, bytes = total, "load job created");

        Ok(Box::new(BigQueryJob {
            http: self.http.clone(),
            project_id: table.project_id,
            job_id,
            location,
            status: job.status,
            poll: Backoff::constant(self.poll_interval),
        }))
    }
}

/// A BigQuery load job
#[derive(Debug)]
pub struct BigQueryJob {
    http: HttpClient,
    project_id: String,
    job_id: String,
    location: Option<String>,
    status: JobStatus,
    poll: Backoff,
}

#[async_trait]
impl LoadJob for BigQueryJob {
    fn id(&self) -> &str {
        &self.job_id
    }

    async fn wait(&mut self, cancel: &CancellationToken) -> Result<JobStatus> {
        if self.status.is_done() {
            return Ok(self.status.clone());
        }

        let http = &self.http;
        let url = format!("bigquery/v2/projects/{}/jobs/{}", self.project_id, self.job_id);
        let url = url.as_str();
        let location = self.location.as_deref();

        let status = retry_until(cancel, self.poll, move || async move {
            let mut config = RequestConfig::new();
            if let Some(location) = location {
                config = config.query("location", location);
            }

            match http.get_json::<JobResource>(url, config).await {
                Ok(job) if job.status.is_done() => Ok(Attempt::Done(job.status)),
                Ok(job) => {
                    debug!(state = ?job.status.state, "load job not done");
                    Ok(Attempt::Retry)
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "polling load job failed, will retry");
                    Ok(Attempt::Retry)
                }
                Err(e) => Err(e),
            }
        })
        .await?;

        self.status = status.clone();
        Ok(status)
    }
}
