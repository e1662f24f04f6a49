//! CLI runner - executes commands

use crate::auth::{AuthConfig, Authenticator, ServiceAccountKey};
use crate::cli::commands::{Cli, Commands, ExportArgs};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::export::{format_bytes, Exporter};
use crate::http::HttpClient;
use crate::listing::{MigrationCenterClient, ProjectAndLocation};
use crate::schema::ExporterSchema;
use crate::warehouse::{BigQueryWarehouse, ObjectStoreWarehouse, Warehouse};
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Export(args) => self.export(args).await,
            Commands::DumpSchema => Self::dump_schema(),
        }
    }

    /// Load the config file, or the defaults without one
    fn load_config(&self) -> Result<ExportConfig> {
        match &self.cli.config {
            Some(path) => ExportConfig::from_path(path),
            None => Ok(ExportConfig::default()),
        }
    }

    fn dump_schema() -> Result<()> {
        // Round trip so the output reflects what is actually loaded
        let schema = ExporterSchema::embedded()?;
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    async fn export(&self, args: &ExportArgs) -> Result<()> {
        let mut config = self.load_config()?;
        apply_args(&mut config, args);
        let params = config.export_params()?;

        let authenticator = Authenticator::new(auth_config(args, &config)?);
        let source_http = HttpClient::with_authenticator(
            config.http.client_config(&config.endpoints.migration_center),
            authenticator.clone(),
        )?;
        let source = MigrationCenterClient::new(
            source_http,
            ProjectAndLocation::new(&params.project_id, &params.region),
        )
        .with_page_size(config.page_size);

        let warehouse: Arc<dyn Warehouse> = match config.destination.as_deref() {
            Some(url) => {
                debug!(destination = url, "writing to object store");
                Arc::new(ObjectStoreWarehouse::parse(url)?)
            }
            None => {
                let http = HttpClient::with_authenticator(
                    config.http.client_config(&config.endpoints.bigquery),
                    authenticator,
                )?;
                Arc::new(BigQueryWarehouse::new(http))
            }
        };

        let summary = Exporter::new(Arc::new(source), warehouse)
            .export(&params)
            .await?;

        for table in &summary.tables {
            println!(
                "{}: {} records, {}",
                table.table,
                table.records,
                format_bytes(table.bytes)
            );
        }
        println!(
            "export complete, {} transferred",
            format_bytes(summary.bytes_transferred)
        );
        Ok(())
    }
}

/// Override config values with the ones given on the command line
pub(crate) fn apply_args(config: &mut ExportConfig, args: &ExportArgs) {
    let overrides = [
        (&mut config.project, &args.project),
        (&mut config.dataset, &args.dataset),
        (&mut config.table_prefix, &args.table_prefix),
        (&mut config.region, &args.region),
        (&mut config.target_project, &args.target_project),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            field.clone_from(value);
        }
    }

    config.force |= args.force;
    if args.schema_path.is_some() {
        config.schema_path.clone_from(&args.schema_path);
    }
    if args.destination.is_some() {
        config.destination.clone_from(&args.destination);
    }
    if args.credentials_file.is_some() {
        config.credentials_file.clone_from(&args.credentials_file);
    }
}

/// Pick the credentials: an access token first, then a service account key
fn auth_config(args: &ExportArgs, config: &ExportConfig) -> Result<AuthConfig> {
    if let Some(token) = args.access_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(AuthConfig::Bearer {
            token: token.to_string(),
        });
    }

    match &config.credentials_file {
        Some(path) => Ok(AuthConfig::service_account(ServiceAccountKey::from_file(path)?)),
        None => Err(Error::auth(
            "no credentials, pass --access-token or set GOOGLE_APPLICATION_CREDENTIALS",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_args_override_config() {
        let mut config = ExportConfig {
            project: "from-file".into(),
            dataset: "file_ds".into(),
            region: "europe-west1".into(),
            ..ExportConfig::default()
        };
        let args = ExportArgs {
            project: Some("from-cli".into()),
            table_prefix: Some("mc_".into()),
            force: true,
            destination: Some("/tmp/out".into()),
            ..ExportArgs::default()
        };

        apply_args(&mut config, &args);

        assert_eq!(config.project, "from-cli");
        assert_eq!(config.dataset, "file_ds");
        assert_eq!(config.region, "europe-west1");
        assert_eq!(config.table_prefix, "mc_");
        assert!(config.force);
        assert_eq!(config.destination.as_deref(), Some("/tmp/out"));
    }

    #[test]
    fn test_access_token_wins() {
        let args = ExportArgs {
            access_token: Some("tok".into()),
            ..ExportArgs::default()
        };
        let config = ExportConfig {
            credentials_file: Some(PathBuf::from("/nonexistent.json")),
            ..ExportConfig::default()
        };

        assert!(matches!(
            auth_config(&args, &config).unwrap(),
            AuthConfig::Bearer { ref token } if token == "tok"
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let err = auth_config(&ExportArgs::default(), &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Auth { .. }));
    }
}
