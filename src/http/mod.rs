//! HTTP client module
//!
//! Provides the HTTP client shared by the Migration Center and BigQuery
//! clients.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Integration with auth module
//! - **Error Decoding**: Google API error bodies become `Error::Api`

mod client;
mod rate_limit;

pub use client::{api_error, HttpClient, HttpClientConfig, RequestBody, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
