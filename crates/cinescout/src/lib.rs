//! CineScout application core.
//!
//! This library provides the aggregation & view-state controller: the
//! single source of truth for the presentation layer. It owns all
//! application state, mediates the catalog and assistant clients, merges
//! and deduplicates results, and derives the displayed list.

pub mod clients;
pub mod controller;
pub mod state;

pub use clients::{Assistant, Catalog};
pub use controller::Controller;
pub use state::{ChatPhase, DetailState, DisplayItem, Pagination, Phase, SearchContext, Snapshot};
