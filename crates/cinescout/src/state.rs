//! Controller state types.
//!
//! Loading and error conditions are tagged unions per concern rather than
//! independent boolean flags, so illegal combinations (loading and errored
//! at once, a detail record without a selection) are unrepresentable.

use shared::models::{
    ChatMessage, DetailRecord, FilterOption, Kind, MediaItem, SortOption, View,
};

/// Result-list phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading { message: String },
    Error { message: String },
}

impl Phase {
    pub fn loading(message: impl Into<String>) -> Self {
        Phase::Loading {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Phase::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading { .. })
    }
}

/// Detail-panel phase. Errors here are scoped to the panel and never touch
/// the result list.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Closed,
    Loading { kind: Kind, id: u64 },
    Ready(DetailRecord),
    Error { message: String },
}

/// Chat-panel phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Waiting,
}

/// The retained queries of the active search, used to re-issue the same
/// semantic query for pagination and language changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchContext {
    pub literal: String,
    pub semantic: String,
}

/// Pagination cursor state.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// Last successfully fetched page
    pub page: u32,
    /// Whether the most recent page was a full one
    pub can_load_more: bool,
    /// Whether a next-page fetch is in flight
    pub fetching: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            can_load_more: true,
            fetching: false,
        }
    }
}

/// A result-list item decorated for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub item: MediaItem,
    pub favorited: bool,
}

/// Read-only view of the controller for the presentation layer.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: View,
    pub phase: Phase,
    pub results: Vec<DisplayItem>,
    pub pagination: Pagination,
    pub sort: SortOption,
    pub filter: FilterOption,
    pub detail: DetailState,
    pub chat: Vec<ChatMessage>,
    pub chat_phase: ChatPhase,
    pub language: String,
    pub region: String,
    pub history: Vec<String>,
}
