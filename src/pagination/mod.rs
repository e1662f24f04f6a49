//! Pagination module
//!
//! Turns a token-paginated listing into a lazy stream of objects and then
//! into a stream of JSON lines.
//!
//! # Overview
//!
//! A [`PageFetcher`] knows how to fetch one page given a continuation token.
//! [`ObjectIterator`] walks the pages one object at a time, retrying
//! transient failures with a backoff. [`ObjectReader`] serializes the
//! objects on demand and hands out bytes, either through a `read`-style
//! call or as a [`RecordStream`] of chunks, while counting progress in a
//! shared [`ReadProgress`].

mod iterator;
mod reader;
mod types;

pub use iterator::ObjectIterator;
pub use reader::{ObjectReader, RecordStream};
pub use types::{Page, PageFetcher, ReadProgress};
