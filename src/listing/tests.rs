//! Tests for the listing module

use super::*;
use crate::backoff::Backoff;
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::ObjectIterator;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARENT: &str = "/v1/projects/my-project/locations/us-central1";

fn client(server: &MockServer) -> MigrationCenterClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    let http = HttpClient::with_config(config).unwrap();
    MigrationCenterClient::new(http, ProjectAndLocation::new("my-project", "us-central1"))
        .with_page_size(2)
}

#[test]
fn test_project_and_location_path() {
    let pal = ProjectAndLocation::new("p", "europe-west1");
    assert_eq!(pal.path(), "projects/p/locations/europe-west1");
    assert_eq!(pal.to_string(), pal.path());
}

#[tokio::test]
async fn test_asset_pages_follow_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/assets")))
        .and(query_param("pageSize", "2"))
        .and(query_param("view", "ASSET_VIEW_FULL"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "assets": [
                {"name": "assets/a", "labels": {"env": "prod"}},
                {"name": "assets/b"}
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/assets")))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "assets": [{"name": "assets/c"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mc = client(&server);
    let mut objects = ObjectIterator::new(mc.assets());

    let mut names = Vec::new();
    while let Some(asset) = objects.next().await.unwrap() {
        names.push(asset.name);
    }

    assert_eq!(names, vec!["assets/a", "assets/b", "assets/c"]);
    assert_eq!(objects.pages_fetched(), 2);
}

#[tokio::test]
async fn test_empty_listing_has_no_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/groups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let page = client(&server).groups().fetch_page(None).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.is_last());
}

#[tokio::test]
async fn test_preference_sets_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/preferenceSets")))
        .and(query_param_is_missing("view"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "preferenceSets": [{"name": "preferenceSets/default", "displayName": "Default"}],
            "nextPageToken": ""
        })))
        .mount(&server)
        .await;

    let page = client(&server).preference_sets().fetch_page(None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].display_name, "Default");
    assert!(page.is_last());
}

#[tokio::test]
async fn test_transient_listing_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/groups")))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/groups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "groups": [{"name": "groups/g1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut objects = ObjectIterator::new(client(&server).groups())
        .with_backoff(Backoff::constant(Duration::from_millis(10)));

    assert_eq!(objects.next().await.unwrap().unwrap().name, "groups/g1");
    assert!(objects.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_terminal_listing_error_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/assets")))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "Permission denied"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut objects = ObjectIterator::new(client(&server).assets());
    let err = objects.next().await.unwrap_err();

    assert!(err.is_status(403));
}

#[tokio::test]
async fn test_asset_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PARENT}/assets:aggregateValues")))
        .and(body_json(serde_json::json!({
            "aggregations": [{"field": "*", "count": {}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"field": "*", "count": {"value": "1234"}}]
        })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).asset_count().await.unwrap(), 1234);
}

#[tokio::test]
async fn test_asset_count_missing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PARENT}/assets:aggregateValues")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;

    assert!(client(&server).asset_count().await.is_err());
}
