//! TMDb catalog client for CineScout.
//!
//! This library provides a rate-limited client for the TMDb v3 API:
//! multi-search, trending listings, title details, similar/recommended
//! listings, and watch-provider lookups, all mapped into the shared
//! domain models.

pub mod client;
pub mod error;
pub mod rate_limiter;

mod types;

pub use client::TmdbClient;
pub use error::CatalogError;
pub use rate_limiter::RateLimiter;

/// Convenience type alias for results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
