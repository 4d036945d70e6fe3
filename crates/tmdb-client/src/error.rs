//! Error types for catalog requests.

use thiserror::Error;

/// Errors that can occur when talking to the TMDb API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The client was constructed without an API key.
    #[error("TMDb API key cannot be empty")]
    MissingApiKey,

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (connection, timeout, ...).
    #[error("TMDb request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API key was rejected.
    #[error("TMDb API key is invalid or missing")]
    Unauthorized,

    /// The requested resource does not exist.
    #[error("TMDb resource not found: {endpoint}")]
    NotFound { endpoint: String },

    /// The server-side rate limit was hit.
    #[error("TMDb rate limit exceeded, please try again later")]
    RateLimited,

    /// Any other non-success status.
    #[error("TMDb request to {endpoint} returned status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    /// The response body could not be decoded.
    #[error("Failed to parse TMDb response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}
