//! Listing module
//!
//! The source side of an export: everything mc2bq reads from the Migration
//! Center API.
//!
//! [`MigrationCenter`] hands out one [`PageFetcher`](crate::pagination::PageFetcher)
//! per record kind plus the total asset count used for progress reports.
//! [`MigrationCenterClient`] implements it over the REST API.

mod client;
mod types;

pub use client::{ListFetcher, MigrationCenterClient, DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE};
pub use types::{MigrationCenter, ProjectAndLocation};

#[cfg(test)]
mod tests;
