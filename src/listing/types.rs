//! Listing types and traits

use crate::error::Result;
use crate::model::{Asset, Group, PreferenceSet};
use crate::pagination::PageFetcher;
use async_trait::async_trait;
use std::fmt;

/// A Migration Center project and region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectAndLocation {
    pub project: String,
    pub location: String,
}

impl ProjectAndLocation {
    pub fn new(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
        }
    }

    /// Resource path, `projects/{project}/locations/{location}`
    pub fn path(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }
}

impl fmt::Display for ProjectAndLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Source of the objects of every record kind.
///
/// Fetchers are independent of each other so each record kind can be read
/// by its own task.
#[async_trait]
pub trait MigrationCenter: Send + Sync {
    /// Total number of assets, used to report progress
    async fn asset_count(&self) -> Result<i64>;

    /// Pages of assets with their full details
    fn assets(&self) -> Box<dyn PageFetcher<Asset>>;

    /// Pages of groups
    fn groups(&self) -> Box<dyn PageFetcher<Group>>;

    /// Pages of preference sets
    fn preference_sets(&self) -> Box<dyn PageFetcher<PreferenceSet>>;
}
