//! Object store implementation (local filesystem, S3, R2, GCS, Azure)
//!
//! A table is a directory holding the records and the schema they follow:
//!
//! ```text
//! {prefix}/{dataset}/{table}/data.jsonl
//! {prefix}/{dataset}/{table}/schema.json
//! ```

use super::types::{CompletedJob, DatasetRef, JobStatus, LoadJob, LoadRequest, TableRef, Warehouse};
use crate::error::{Error, Result};
use crate::types::WriteDisposition;
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, WriteMultipart};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the records object of a table
pub const DATA_FILE: &str = "data.jsonl";

/// Name of the schema object of a table
pub const SCHEMA_FILE: &str = "schema.json";

/// Number of multipart chunks uploaded concurrently
const UPLOAD_CONCURRENCY: usize = 4;

/// Tables stored as JSON lines objects in an object store
#[derive(Debug, Clone)]
pub struct ObjectStoreWarehouse {
    store: Arc<dyn ObjectStore>,
    /// Base path within the bucket or container
    prefix: String,
    /// URL scheme, for logging
    scheme: String,
}

impl ObjectStoreWarehouse {
    /// Wrap an existing store
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
            scheme: "memory".to_string(),
        }
    }

    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///local/path/` or `/local/path/` - Local filesystem
    ///
    /// Cloud credentials are read from the environment.
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(rest, "s3")
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::parse_s3(rest, "r2")
        } else if let Some(rest) = url.strip_prefix("gs://") {
            let (bucket, prefix) = split_bucket(rest)?;
            let store = GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;
            Ok(Self::with_scheme(Arc::new(store), prefix, "gs"))
        } else if let Some(rest) = url.strip_prefix("az://") {
            let (container, prefix) = split_bucket(rest)?;
            let store = MicrosoftAzureBuilder::from_env()
                .with_container_name(container)
                .build()
                .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;
            Ok(Self::with_scheme(Arc::new(store), prefix, "az"))
        } else {
            Self::parse_local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    fn with_scheme(store: Arc<dyn ObjectStore>, prefix: &str, scheme: &str) -> Self {
        let mut warehouse = Self::new(store, prefix);
        warehouse.scheme = scheme.to_string();
        warehouse
    }

    fn parse_s3(rest: &str, scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest)?;
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 needs its account endpoint, AWS_ENDPOINT is already read by from_env
        if scheme == "r2" {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;
        Ok(Self::with_scheme(Arc::new(store), prefix, scheme))
    }

    fn parse_local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
        Ok(Self::with_scheme(Arc::new(store), "", "file"))
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Check if this is a cloud destination
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Path of an object of a table
    pub fn object_path(&self, table: &TableRef, file: &str) -> ObjectPath {
        let relative = format!("{}/{}/{file}", table.dataset_id, table.table_id);
        if self.prefix.is_empty() {
            ObjectPath::from(relative)
        } else {
            ObjectPath::from(format!("{}/{relative}", self.prefix))
        }
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        match self.store.head(path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_if_present(&self, path: &ObjectPath) -> Result<()> {
        match self.store.delete(path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Split `bucket/some/prefix` into the bucket and the prefix
fn split_bucket(rest: &str) -> Result<(&str, &str)> {
    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(Error::config("destination URL has no bucket"));
    }
    Ok((bucket, prefix))
}

#[async_trait]
impl Warehouse for ObjectStoreWarehouse {
    async fn create_dataset_if_absent(&self, dataset: &DatasetRef) -> Result<()> {
        // Object stores have no directories, tables are created by their loads
        debug!(%dataset, scheme = %self.scheme, "dataset needs no creation");
        Ok(())
    }

    async fn table_exists(&self, table: &TableRef) -> Result<bool> {
        self.exists(&self.object_path(table, DATA_FILE)).await
    }

    async fn delete_table(&self, table: &TableRef) -> Result<()> {
        self.delete_if_present(&self.object_path(table, DATA_FILE)).await?;
        self.delete_if_present(&self.object_path(table, SCHEMA_FILE)).await
    }

    async fn start_load(&self, mut request: LoadRequest) -> Result<Box<dyn LoadJob>> {
        let table = request.table.to_string();
        let data_path = self.object_path(&request.table, DATA_FILE);

        if request.write_disposition == WriteDisposition::WriteEmpty {
            match self.store.head(&data_path).await {
                Ok(meta) if meta.size > 0 => {
                    return Err(Error::load(&table, "table already contains data"));
                }
                Ok(_) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let upload = self.store.put_multipart(&data_path).await?;
        let mut writer = WriteMultipart::new(upload);
        let mut rows = 0u64;
        let mut bytes = 0u64;

        loop {
            let chunk = match request.source.try_next().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    // The source error is the one worth reporting
                    let _ = writer.abort().await;
                    return Err(e);
                }
            };

            rows += chunk.iter().filter(|&&b| b == b'\n').count() as u64;
            bytes += chunk.len() as u64;
            writer.wait_for_capacity(UPLOAD_CONCURRENCY).await?;
            writer.write(&chunk);
        }
        writer.finish().await?;

        let schema = serde_json::to_vec_pretty(&request.schema)?;
        self.store
            .put(&self.object_path(&request.table, SCHEMA_FILE), schema.into())
            .await?;

        info!(
            table = %table,
            destination = %format!("{}://{data_path}", self.scheme),
            rows,
            bytes,
            "table written"
        );

        Ok(Box::new(CompletedJob::new(
            format!("{}:{table}", self.scheme),
            JobStatus::done(),
        )))
    }
}
