//! Authentication module
//!
//! Supports: Bearer tokens and Google service accounts
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! the access tokens obtained for service accounts until shortly before
//! they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, ServiceAccountKey, CLOUD_PLATFORM_SCOPE, GOOGLE_TOKEN_URI};

#[cfg(test)]
mod tests;
