//! Migration Center REST client

use super::types::{MigrationCenter, ProjectAndLocation};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::model::{Asset, Group, PreferenceSet};
use crate::pagination::{Page, PageFetcher};
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::debug;

/// Default Migration Center endpoint
pub const DEFAULT_ENDPOINT: &str = "https://migrationcenter.googleapis.com";

/// Largest page the API serves
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Migration Center client over the REST API.
///
/// The wrapped [`HttpClient`] must have the API endpoint as its base URL.
#[derive(Debug, Clone)]
pub struct MigrationCenterClient {
    http: HttpClient,
    parent: ProjectAndLocation,
    page_size: u32,
}

impl MigrationCenterClient {
    pub fn new(http: HttpClient, parent: ProjectAndLocation) -> Self {
        Self {
            http,
            parent,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of objects requested per page
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn parent(&self) -> &ProjectAndLocation {
        &self.parent
    }

    fn fetcher<T>(&self, collection: &str, items_key: &'static str) -> ListFetcher<T> {
        ListFetcher::new(
            self.http.clone(),
            format!("v1/{}/{collection}", self.parent),
            items_key,
            self.page_size,
        )
    }
}

#[derive(Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregationResult>,
}

#[derive(Deserialize)]
struct AggregationResult {
    count: Option<AggregationCount>,
}

#[derive(Deserialize)]
struct AggregationCount {
    #[serde(with = "crate::model::int64")]
    value: i64,
}

#[async_trait]
impl MigrationCenter for MigrationCenterClient {
    async fn asset_count(&self) -> Result<i64> {
        let url = format!("v1/{}/assets:aggregateValues", self.parent);
        let body = serde_json::json!({
            "aggregations": [{"field": "*", "count": {}}]
        });

        let response: AggregateResponse = self.http.post_json(&url, body).await?;
        response
            .results
            .first()
            .and_then(|result| result.count.as_ref())
            .map(|count| count.value)
            .ok_or_else(|| Error::Other("asset count missing from aggregation response".into()))
    }

    fn assets(&self) -> Box<dyn PageFetcher<Asset>> {
        Box::new(
            self.fetcher("assets", "assets")
                .with_query("view", "ASSET_VIEW_FULL"),
        )
    }

    fn groups(&self) -> Box<dyn PageFetcher<Group>> {
        Box::new(self.fetcher("groups", "groups"))
    }

    fn preference_sets(&self) -> Box<dyn PageFetcher<PreferenceSet>> {
        Box::new(self.fetcher("preferenceSets", "preferenceSets"))
    }
}

/// Fetches pages of one collection of a Google list API.
///
/// List responses carry the objects under `items_key` and the continuation
/// under `nextPageToken`.
#[derive(Debug)]
pub struct ListFetcher<T> {
    http: HttpClient,
    url: String,
    items_key: &'static str,
    page_size: u32,
    query: Vec<(String, String)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListFetcher<T> {
    pub fn new(http: HttpClient, url: impl Into<String>, items_key: &'static str, page_size: u32) -> Self {
        Self {
            http,
            url: url.into(),
            items_key,
            page_size,
            query: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a query parameter sent with every page request
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send> PageFetcher<T> for ListFetcher<T> {
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<Page<T>> {
        let mut request = RequestConfig::new().query("pageSize", self.page_size.to_string());
        for (key, value) in &self.query {
            request = request.query(key.as_str(), value.as_str());
        }
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        let mut body: JsonValue = self.http.get_json(&self.url, request).await?;

        let items: Vec<T> = match body.get_mut(self.items_key).map(JsonValue::take) {
            Some(items) => serde_json::from_value(items)?,
            None => Vec::new(),
        };
        let next_page_token = body
            .get("nextPageToken")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);

        debug!(
            url = %self.url,
            items = items.len(),
            has_next = next_page_token.is_some(),
            "fetched page"
        );

        Ok(Page::new(items, next_page_token))
    }
}
