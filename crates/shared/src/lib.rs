//! Shared library for CineScout.
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management
//! - Domain models
//! - Persistent preference store
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use store::PrefStore;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
