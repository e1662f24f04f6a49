//! Export configuration
//!
//! Every setting of an export can be kept in a YAML file. Command line
//! flags override the file, and anything left unset gets the defaults below.
//!
//! ```yaml
//! project: my-project
//! region: europe-west1
//! dataset: migration_center
//! table_prefix: mc_
//! backoff:
//!   initial_ms: 500
//! http:
//!   requests_per_second: 5
//! ```

use crate::backoff::Backoff;
use crate::error::{Error, Result};
use crate::export::{ExportParams, DEFAULT_REGION};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::listing;
use crate::schema::ExporterSchema;
use crate::warehouse;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Export Config
// ============================================================================

/// Complete export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Project holding the Migration Center data
    pub project: String,

    /// Migration Center region
    pub region: String,

    /// Project of the destination dataset, `project` when empty
    pub target_project: String,

    /// Destination dataset
    pub dataset: String,

    /// Prepended to every table name
    pub table_prefix: String,

    /// Replace existing tables
    pub force: bool,

    /// Table schema definition, the embedded one when unset
    pub schema_path: Option<PathBuf>,

    /// Object store URL to write to instead of BigQuery
    pub destination: Option<String>,

    /// Objects requested per page
    pub page_size: u32,

    /// Seconds between progress reports
    pub progress_interval_seconds: u64,

    /// Service account key file
    pub credentials_file: Option<PathBuf>,

    /// Backoff between failed page fetches
    pub backoff: BackoffConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// API endpoints
    pub endpoints: EndpointsConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            region: DEFAULT_REGION.to_string(),
            target_project: String::new(),
            dataset: String::new(),
            table_prefix: String::new(),
            force: false,
            schema_path: None,
            destination: None,
            page_size: listing::DEFAULT_PAGE_SIZE,
            progress_interval_seconds: 5,
            credentials_file: None,
            backoff: BackoffConfig::default(),
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Load a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty file is a valid, all-default configuration
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))
    }

    /// Check that everything an export needs is set
    pub fn validate(&self) -> Result<()> {
        if self.project.is_empty() {
            return Err(Error::missing_field("project"));
        }
        if self.dataset.is_empty() {
            return Err(Error::missing_field("dataset"));
        }
        if self.region.is_empty() {
            return Err(Error::missing_field("region"));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be positive"));
        }
        self.endpoints.validate()?;
        self.backoff.validate()
    }

    /// Load the table schemas
    pub fn schema(&self) -> Result<ExporterSchema> {
        match &self.schema_path {
            Some(path) => ExporterSchema::from_path(path),
            None => ExporterSchema::embedded(),
        }
    }

    /// Build the parameters of an export
    pub fn export_params(&self) -> Result<ExportParams> {
        self.validate()?;
        Ok(ExportParams::new(&self.project, &self.dataset, self.schema()?)
            .with_region(&self.region)
            .with_target_project(&self.target_project)
            .with_table_prefix(&self.table_prefix)
            .with_force(self.force)
            .with_progress_interval(Duration::from_secs(self.progress_interval_seconds.max(1)))
            .with_backoff(self.backoff.to_backoff()))
    }
}

// ============================================================================
// Backoff Config
// ============================================================================

/// Backoff between failed page fetches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// First delay in milliseconds
    pub initial_ms: u64,

    /// Growth factor per retry
    pub factor: f64,

    /// Maximum random extra, as a fraction of the delay
    pub jitter: f64,

    /// Largest delay in milliseconds, 0 for none
    pub cap_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        let api = Backoff::API;
        Self {
            initial_ms: api.duration.as_millis() as u64,
            factor: api.factor,
            jitter: api.jitter,
            cap_ms: api.cap.as_millis() as u64,
        }
    }
}

impl BackoffConfig {
    fn validate(&self) -> Result<()> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(Error::config("backoff.factor must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(Error::config("backoff.jitter must be between 0 and 1"));
        }
        Ok(())
    }

    /// Convert into a backoff schedule
    pub fn to_backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.initial_ms),
            self.factor,
            self.jitter,
            Duration::from_millis(self.cap_ms),
        )
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Requests per second across all API calls, 0 for no limit
    pub requests_per_second: u32,

    /// Appended to the user agent, e.g. to identify a deployment
    pub user_agent_suffix: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            requests_per_second: 10,
            user_agent_suffix: None,
        }
    }
}

impl HttpConfig {
    /// User agent sent with every request
    pub fn user_agent(&self) -> String {
        let base = format!("{}/{}", crate::NAME, crate::VERSION);
        match self.user_agent_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => format!("{base}_{suffix}"),
            _ => base,
        }
    }

    /// Client configuration for an API at `base_url`
    pub fn client_config(&self, base_url: &str) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.timeout_seconds.max(1)))
            .user_agent(self.user_agent());

        if self.requests_per_second == 0 {
            builder.no_rate_limit().build()
        } else {
            builder
                .rate_limit(RateLimiterConfig::per_second(self.requests_per_second))
                .build()
        }
    }
}

// ============================================================================
// Endpoints Config
// ============================================================================

/// API endpoints, overridable for testing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub migration_center: String,
    pub bigquery: String,
}

impl EndpointsConfig {
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.migration_center)?;
        url::Url::parse(&self.bigquery)?;
        Ok(())
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            migration_center: listing::DEFAULT_ENDPOINT.to_string(),
            bigquery: warehouse::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.progress_interval_seconds, 5);
        assert_eq!(config.backoff.to_backoff(), Backoff::API);
        assert_eq!(config.http.timeout_seconds, 60);
        assert_eq!(
            config.endpoints.migration_center,
            "https://migrationcenter.googleapis.com"
        );
        assert_eq!(config.endpoints.bigquery, "https://bigquery.googleapis.com");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config = ExportConfig::from_yaml_str(
            r"
project: my-project
dataset: mc
table_prefix: mc_
backoff:
  initial_ms: 500
http:
  requests_per_second: 0
  user_agent_suffix: nightly
",
        )
        .unwrap();

        assert_eq!(config.project, "my-project");
        assert_eq!(config.table_prefix, "mc_");
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.backoff.initial_ms, 500);
        assert!((config.backoff.factor - 1.2).abs() < f64::EPSILON);
        assert!(config.http.user_agent().ends_with("_nightly"));
        assert!(config.http.client_config("http://localhost").rate_limit.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ExportConfig::from_yaml_str("").unwrap(), ExportConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ExportConfig::from_yaml_str("page_size: [1, 2]").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_required_fields() {
        let mut config = ExportConfig::default();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "project"
        ));

        config.project = "p".into();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "dataset"
        ));

        config.dataset = "d".into();
        assert!(config.validate().is_ok());

        config.endpoints.bigquery = "not a url".into();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.endpoints = EndpointsConfig::default();
        config.backoff.jitter = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_params() {
        let config = ExportConfig {
            project: "p".into(),
            dataset: "d".into(),
            target_project: "t".into(),
            force: true,
            ..ExportConfig::default()
        };

        let params = config.export_params().unwrap();
        assert_eq!(params.dataset().to_string(), "t.d");
        assert!(params.force);
        assert_eq!(params.schema, ExporterSchema::embedded().unwrap());
    }

    #[test]
    fn test_schema_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"asset_table": [{"name": "name", "type": "STRING"}]}"#).unwrap();

        let config = ExportConfig {
            schema_path: Some(path),
            ..ExportConfig::default()
        };
        assert_eq!(config.schema().unwrap().asset_table.len(), 1);

        let config = ExportConfig {
            schema_path: Some(dir.path().join("missing.json")),
            ..ExportConfig::default()
        };
        assert!(matches!(config.schema(), Err(Error::InvalidSchema { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mc2bq.yaml");
        fs::write(&path, "project: p\ndataset: d\n").unwrap();

        let config = ExportConfig::from_path(&path).unwrap();
        assert_eq!(config.project, "p");
        assert!(ExportConfig::from_path(dir.path().join("nope.yaml")).is_err());
    }
}
