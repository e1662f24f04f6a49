//! Backoff and retry module
//!
//! Provides the delay schedule used between attempts and the retry loops
//! built on top of it.
//!
//! # Overview
//!
//! A [`Backoff`] is a small value type: every retry loop takes its own copy
//! and advances it in place, so concurrent loops never share state.
//! [`retry_until`] drives an operation that reports whether it is done, and
//! [`retry_on_transient`] retries an ordinary fallible operation while its
//! errors are classified as transient.
//!
//! Both loops race every attempt and every sleep against a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) and return
//! [`Error::Cancelled`](crate::Error::Cancelled) as soon as it fires.

mod retry;
mod types;

pub use retry::{retry_on_transient, retry_until, Attempt};
pub use types::Backoff;
