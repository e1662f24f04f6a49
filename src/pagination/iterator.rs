//! Object iterator over a paginated listing

use super::types::PageFetcher;
use crate::backoff::{retry_on_transient, Backoff};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Yields the objects of a listing one at a time, fetching pages lazily.
///
/// Page fetches that fail with a transient error are retried with the
/// iterator's backoff until they succeed or the token is cancelled. Once the
/// end of the listing is reached every later call returns `Ok(None)`
/// without touching the fetcher.
pub struct ObjectIterator<T> {
    fetcher: Box<dyn PageFetcher<T>>,
    backoff: Backoff,
    cancel: CancellationToken,
    buffer: VecDeque<T>,
    next_page_token: Option<String>,
    started: bool,
    exhausted: bool,
    pages_fetched: u64,
}

impl<T: Send> ObjectIterator<T> {
    /// Create an iterator that retries with [`Backoff::API`]
    pub fn new(fetcher: Box<dyn PageFetcher<T>>) -> Self {
        Self {
            fetcher,
            backoff: Backoff::API,
            cancel: CancellationToken::new(),
            buffer: VecDeque::new(),
            next_page_token: None,
            started: false,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Set the backoff used between failed page fetches
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Stop fetching when `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Return the next object, or `None` at the end of the listing
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            if self.exhausted {
                return Ok(None);
            }

            if self.started && self.next_page_token.is_none() {
                self.exhausted = true;
                return Ok(None);
            }

            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let token = self.next_page_token.take();
        let result = {
            let fetcher = &self.fetcher;
            let page_token = token.as_deref();
            retry_on_transient(&self.cancel, self.backoff, Error::is_transient, move || {
                fetcher.fetch_page(page_token)
            })
            .await
        };

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                // Keep the position so a later call resumes the same page
                self.next_page_token = token;
                return Err(e);
            }
        };

        self.started = true;
        self.pages_fetched += 1;
        self.next_page_token = page.next_page_token.none_if_empty();
        debug!(
            page = self.pages_fetched,
            items = page.items.len(),
            has_more = self.next_page_token.is_some(),
            "fetched page"
        );
        self.buffer.extend(page.items);
        Ok(())
    }
}
