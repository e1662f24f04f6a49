//! Integration tests using a mock Migration Center API
//!
//! Tests the full flow: paginated listings → normalized JSON lines → local
//! object store tables

use mc2bq::backoff::Backoff;
use mc2bq::export::{ExportParams, Exporter};
use mc2bq::http::{HttpClient, HttpClientConfig};
use mc2bq::listing::{MigrationCenterClient, ProjectAndLocation};
use mc2bq::schema::ExporterSchema;
use mc2bq::warehouse::ObjectStoreWarehouse;
use mc2bq::{Error, TableKind};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARENT: &str = "/v1/projects/src-project/locations/us-central1";

fn source(server: &MockServer) -> MigrationCenterClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    let http = HttpClient::with_config(config).unwrap();
    MigrationCenterClient::new(http, ProjectAndLocation::new("src-project", "us-central1"))
        .with_page_size(2)
}

fn params() -> ExportParams {
    ExportParams::new("src-project", "mc", ExporterSchema::embedded().unwrap())
        .with_table_prefix("mc_")
        .with_backoff(Backoff::constant(Duration::from_millis(10)))
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

async fn mount_asset_count(server: &MockServer, count: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{PARENT}/assets:aggregateValues")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"field": "*", "count": {"value": count}}]
        })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/{resource}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_export_to_local_store() {
    let server = MockServer::start().await;
    mount_asset_count(&server, "3").await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/assets")))
        .and(query_param("view", "ASSET_VIEW_FULL"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [
                {"name": "assets/a", "labels": {"zone": "b", "env": "prod"}},
                {"name": "assets/b", "assignedGroups": ["groups/g1"]}
            ],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/assets")))
        .and(query_param("pageToken", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{"name": "assets/c"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    mount_listing(
        &server,
        "groups",
        json!({"groups": [{"name": "groups/g1", "displayName": "Web tier"}]}),
    )
    .await;
    mount_listing(&server, "preferenceSets", json!({})).await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("out");
    let warehouse = ObjectStoreWarehouse::parse(root.to_str().unwrap()).unwrap();

    let exporter = Exporter::new(Arc::new(source(&server)), Arc::new(warehouse));
    let summary = exporter.export(&params()).await.unwrap();

    assert_eq!(summary.table(TableKind::Assets).unwrap().records, 3);
    assert_eq!(summary.table(TableKind::Groups).unwrap().records, 1);
    assert_eq!(summary.table(TableKind::PreferenceSets).unwrap().records, 0);
    assert_eq!(summary.records(), 4);

    let assets = read_lines(&root.join("mc/mc_assets/data.jsonl"));
    let names: Vec<_> = assets.iter().map(|a| a["name"].clone()).collect();
    assert_eq!(names, vec![json!("assets/a"), json!("assets/b"), json!("assets/c")]);
    assert_eq!(
        assets[0]["labels"],
        json!([{"key": "env", "value": "prod"}, {"key": "zone", "value": "b"}])
    );
    assert_eq!(assets[1]["assigned_groups"], json!(["groups/g1"]));

    let groups = read_lines(&root.join("mc/mc_groups/data.jsonl"));
    assert_eq!(groups[0]["display_name"], "Web tier");

    let preference_sets =
        std::fs::read_to_string(root.join("mc/mc_preference_sets/data.jsonl")).unwrap_or_default();
    assert!(preference_sets.is_empty());

    let schema: Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("mc/mc_groups/schema.json")).unwrap())
            .unwrap();
    assert_eq!(schema[0]["name"], "name");
}

#[tokio::test]
async fn test_existing_tables_fail_without_force() {
    let server = MockServer::start().await;
    mount_asset_count(&server, "1").await;
    mount_listing(&server, "assets", json!({"assets": [{"name": "assets/new"}]})).await;
    mount_listing(&server, "groups", json!({})).await;
    mount_listing(&server, "preferenceSets", json!({})).await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let table = root.join("mc/mc_assets");
    std::fs::create_dir_all(&table).unwrap();
    std::fs::write(table.join("data.jsonl"), "{\"name\":\"assets/old\"}\n").unwrap();

    let exporter = || {
        let warehouse = ObjectStoreWarehouse::parse(root.to_str().unwrap()).unwrap();
        Exporter::new(Arc::new(source(&server)), Arc::new(warehouse))
    };

    let err = exporter().export(&params()).await.unwrap_err();
    assert!(matches!(err, Error::TableExists { .. }), "{err}");
    assert_eq!(
        std::fs::read_to_string(table.join("data.jsonl")).unwrap(),
        "{\"name\":\"assets/old\"}\n"
    );

    exporter()
        .export(&params().with_force(true))
        .await
        .unwrap();

    let assets = read_lines(&table.join("data.jsonl"));
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["name"], "assets/new");
}

#[tokio::test]
async fn test_listing_failure_aborts_export() {
    let server = MockServer::start().await;
    mount_asset_count(&server, "1").await;
    mount_listing(&server, "assets", json!({"assets": [{"name": "assets/a"}]})).await;
    mount_listing(&server, "preferenceSets", json!({})).await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/groups")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "permission denied", "status": "PERMISSION_DENIED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let warehouse = ObjectStoreWarehouse::parse(dir.path().to_str().unwrap()).unwrap();
    let exporter = Exporter::new(Arc::new(source(&server)), Arc::new(warehouse));

    let err = exporter.export(&params()).await.unwrap_err();
    assert!(err.to_string().contains("permission denied"), "{err}");
    assert!(err.to_string().contains("groups"), "{err}");
}
