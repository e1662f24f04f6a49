//! Pagination types and traits

use crate::error::Result;
use crate::types::OptionStringExt;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Objects on this page, in listing order
    pub items: Vec<T>,
    /// Token of the following page, `None` on the last page
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Create a page. An empty token means there are no more pages.
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.none_if_empty(),
        }
    }

    /// Create the last page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Check if no page follows this one
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

/// Fetches single pages of a listing
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetch the page identified by `page_token`, the first page for `None`
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<Page<T>>;
}

/// Counters of a reader, shared with whoever reports progress.
///
/// Only the reader writes, anyone may read at any time.
#[derive(Debug, Default)]
pub struct ReadProgress {
    objects_read: AtomicU64,
    bytes_read: AtomicU64,
}

impl ReadProgress {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects serialized so far
    pub fn objects_read(&self) -> u64 {
        self.objects_read.load(Ordering::Relaxed)
    }

    /// Number of bytes handed out so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub(crate) fn add_object(&self) {
        self.objects_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_bytes(&self, n: usize) {
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
    }
}
