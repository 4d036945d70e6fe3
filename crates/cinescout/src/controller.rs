//! Aggregation & view-state controller.
//!
//! Single source of truth for what the presentation layer shows. The
//! controller mediates all remote calls, merges and deduplicates results
//! across search strategies and pages, enriches items with watch-provider
//! info, and derives the displayed (sorted/filtered) list from canonical
//! state.
//!
//! Operations take `&mut self` and run to completion on one task, so no
//! two operations ever interleave their state writes and in-flight
//! responses cannot overwrite newer state.

use crate::clients::{Assistant, Catalog};
use crate::state::{
    ChatPhase, DetailState, DisplayItem, Pagination, Phase, SearchContext, Snapshot,
};
use anyhow::{Context, Result};
use futures::future::{join_all, try_join_all};
use shared::models::{
    self, ChatMessage, ChatRole, DetailRecord, FilterOption, Kind, MediaItem, SortOption, View,
    PAGE_SIZE,
};
use shared::PrefStore;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Preference store keys
const KEY_FAVORITES: &str = "favorites";
const KEY_HISTORY: &str = "history";
const KEY_LANGUAGE: &str = "language";
const KEY_REGION: &str = "region";

/// Bounded history length, most recent first
const HISTORY_LIMIT: usize = 10;

/// Maximum number of related titles on a detail record
const MAX_RELATED: usize = 20;

/// Loader messages shown while an operation is in flight
const MSG_INTERPRETING: &str = "Understanding your request...";
const MSG_SEARCHING: &str = "Searching by concept & keywords...";
const MSG_TRENDING: &str = "Fetching trending titles...";
const MSG_FAVORITES: &str = "Loading your favorites...";

/// Opening message of the chat transcript
const CHAT_GREETING: &str =
    "Hi! I'm the CineScout assistant. Ask me for movie recommendations, trivia, or anything film-related!";

/// Transcript entry appended when a chat request fails
const CHAT_ERROR: &str = "Sorry, I ran into a problem. Please try again.";

/// The application controller.
pub struct Controller {
    catalog: Arc<dyn Catalog>,
    assistant: Arc<dyn Assistant>,
    store: PrefStore,

    view: View,
    phase: Phase,
    results: Vec<MediaItem>,
    pagination: Pagination,
    sort: SortOption,
    filter: FilterOption,
    search: Option<SearchContext>,
    detail: DetailState,
    chat: Vec<ChatMessage>,
    chat_phase: ChatPhase,
    language: String,
    region: String,
    favorites: Vec<String>,
    history: Vec<String>,
}

impl Controller {
    /// Create a controller, loading persisted preferences from the store.
    pub fn new(catalog: Arc<dyn Catalog>, assistant: Arc<dyn Assistant>, store: PrefStore) -> Self {
        let default_language = models::SUPPORTED_LANGUAGES[0];
        let language = store.get_or(KEY_LANGUAGE, default_language.code.to_string());
        let region = store.get_or(KEY_REGION, default_language.region.to_string());
        let favorites = store.get_or(KEY_FAVORITES, Vec::new());
        let history = store.get_or(KEY_HISTORY, Vec::new());

        Self {
            catalog,
            assistant,
            store,
            view: View::Trending,
            phase: Phase::Idle,
            results: Vec::new(),
            pagination: Pagination::default(),
            sort: SortOption::Popularity,
            filter: FilterOption::All,
            search: None,
            detail: DetailState::Closed,
            chat: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: CHAT_GREETING.to_string(),
            }],
            chat_phase: ChatPhase::Idle,
            language,
            region,
            favorites,
            history,
        }
    }

    // ========== Search ==========

    /// Run a new search: interpret the query, issue the semantic and
    /// literal searches concurrently, and replace the result set with
    /// their enriched, deduplicated union.
    pub async fn search(&mut self, query: &str) {
        let literal = query.trim().to_string();
        if literal.is_empty() {
            return;
        }

        self.detail = DetailState::Closed;
        self.view = View::Results;
        self.phase = Phase::loading(MSG_INTERPRETING);
        self.results.clear();
        self.pagination = Pagination::default();
        self.sort = SortOption::Popularity;
        self.filter = FilterOption::All;
        self.remember_query(&literal);

        match self.run_search(&literal).await {
            Ok(()) => self.phase = Phase::Idle,
            Err(e) => {
                self.results.clear();
                self.fail(e);
            }
        }
    }

    async fn run_search(&mut self, literal: &str) -> Result<()> {
        let semantic = self
            .assistant
            .interpret(literal)
            .await
            .context("Failed to get search terms from the assistant")?;

        info!(literal = literal, semantic = %semantic, "Interpreted search query");
        self.search = Some(SearchContext {
            literal: literal.to_string(),
            semantic: semantic.clone(),
        });

        self.phase = Phase::loading(MSG_SEARCHING);
        let (semantic_results, literal_results) = tokio::try_join!(
            self.catalog.search(&semantic, 1, &self.language),
            self.catalog.search(literal, 1, &self.language),
        )
        .context("Search failed")?;

        // Semantic results first; on key collisions the literal entry
        // arrives later and its fields win, while the position stays
        // first-seen.
        let mut combined = semantic_results;
        combined.extend(literal_results);
        self.apply_page(combined, Vec::new()).await;

        Ok(())
    }

    // ========== Trending ==========

    /// Load page 1 of the trending listing, replacing the result set.
    pub async fn load_trending(&mut self) {
        self.phase = Phase::loading(MSG_TRENDING);
        match self
            .catalog
            .trending(1, &self.language)
            .await
            .context("Failed to fetch trending titles")
        {
            Ok(items) => {
                self.apply_page(items, Vec::new()).await;
                self.phase = Phase::Idle;
            }
            Err(e) => self.fail(e),
        }
    }

    // ========== Pagination ==========

    /// Fetch the next page of the current view and merge it onto the
    /// existing result set. No-op while a fetch is in flight or when the
    /// last page was short.
    pub async fn load_more(&mut self) {
        if self.pagination.fetching || !self.pagination.can_load_more {
            return;
        }

        let next_page = self.pagination.page + 1;
        let request = match self.view {
            View::Results => match &self.search {
                Some(context) => context.semantic.clone(),
                None => return,
            },
            View::Trending => String::new(),
            View::Favorites => return,
        };

        self.pagination.fetching = true;
        let fetched = match self.view {
            View::Results => self.catalog.search(&request, next_page, &self.language).await,
            _ => self.catalog.trending(next_page, &self.language).await,
        };

        match fetched.context("Failed to fetch the next page") {
            Ok(items) => {
                let prior = std::mem::take(&mut self.results);
                self.apply_page(items, prior).await;
                self.pagination.page = next_page;
            }
            Err(e) => self.fail(e),
        }
        self.pagination.fetching = false;
    }

    // ========== Enrichment & merge ==========

    /// Enrich a fetched page and merge it onto the prior set.
    ///
    /// "Can load more" reflects only the size of the newly fetched page,
    /// independent of how much has accumulated.
    async fn apply_page(&mut self, new_items: Vec<MediaItem>, prior: Vec<MediaItem>) {
        let full_page = new_items.len() >= PAGE_SIZE;
        let enriched = self.enrich(new_items).await;
        self.results = merge_results(prior, enriched);
        self.pagination.can_load_more = full_page;
    }

    /// Attach watch-provider info to every item, fanning the lookups out
    /// concurrently and joining them all before returning. A failed lookup
    /// degrades that one item to no provider info.
    async fn enrich(&self, items: Vec<MediaItem>) -> Vec<MediaItem> {
        let lookups = items.into_iter().map(|mut item| async move {
            match self
                .catalog
                .watch_providers(item.kind, item.id, &self.region)
                .await
            {
                Ok(providers) => item.watch_providers = providers,
                Err(e) => {
                    warn!(
                        key = %item.key(),
                        error = %e,
                        "Watch-provider lookup failed, continuing without provider info"
                    );
                }
            }
            item
        });

        join_all(lookups).await
    }

    // ========== Views ==========

    /// Switch the active view, resetting the result set and pagination.
    pub async fn change_view(&mut self, view: View) {
        self.detail = DetailState::Closed;
        self.view = view;
        self.results.clear();
        self.pagination = Pagination::default();

        match view {
            View::Trending => {
                self.search = None;
                self.sort = SortOption::Popularity;
                self.filter = FilterOption::All;
                self.load_trending().await;
            }
            View::Favorites => {
                self.search = None;
                self.load_favorites().await;
            }
            // Results is only entered through a search
            View::Results => {}
        }
    }

    /// Load full details for every favorite concurrently, dropping keys
    /// that no longer resolve to a record.
    async fn load_favorites(&mut self) {
        self.phase = Phase::loading(MSG_FAVORITES);

        let keys: Vec<(Kind, u64)> = self
            .favorites
            .iter()
            .filter_map(|key| models::parse_key(key))
            .collect();

        let fetched = try_join_all(
            keys.iter()
                .map(|&(kind, id)| self.catalog.details(kind, id, &self.language)),
        )
        .await;

        match fetched.context("Failed to load favorites") {
            Ok(records) => {
                let items: Vec<MediaItem> = records.into_iter().flatten().collect();
                self.apply_page(items, Vec::new()).await;
                self.phase = Phase::Idle;
            }
            Err(e) => self.fail(e),
        }
        self.pagination.can_load_more = false;
    }

    // ========== Localization ==========

    /// Switch the display language (and its paired region), then refetch
    /// the active view. The favorites view keeps its loaded language until
    /// revisited.
    pub async fn change_language(&mut self, code: &str) {
        let Some(option) = models::language_option(code) else {
            warn!(code = code, "Ignoring unsupported language code");
            return;
        };

        self.language = option.code.to_string();
        self.region = option.region.to_string();
        self.persist(KEY_LANGUAGE, &self.language);
        self.persist(KEY_REGION, &self.region);
        info!(language = %self.language, region = %self.region, "Language changed");

        match self.view {
            View::Trending => {
                self.results.clear();
                self.pagination = Pagination::default();
                self.load_trending().await;
            }
            View::Results => {
                let Some(context) = self.search.clone() else {
                    return;
                };
                self.results.clear();
                self.pagination = Pagination::default();
                self.phase = Phase::loading(MSG_SEARCHING);
                match self
                    .catalog
                    .search(&context.semantic, 1, &self.language)
                    .await
                    .context("Failed to refresh search results")
                {
                    Ok(items) => {
                        self.apply_page(items, Vec::new()).await;
                        self.phase = Phase::Idle;
                    }
                    Err(e) => self.fail(e),
                }
            }
            View::Favorites => {}
        }
    }

    // ========== Detail view ==========

    /// Select a title: fetch its details, watch providers, and related
    /// listings concurrently. Any previous record is cleared before the
    /// fetch so stale content is never shown.
    pub async fn select(&mut self, kind: Kind, id: u64) {
        self.detail = DetailState::Loading { kind, id };

        let result = tokio::try_join!(
            self.catalog.details(kind, id, &self.language),
            self.catalog.watch_providers(kind, id, &self.region),
            self.catalog.similar(kind, id, &self.language),
            self.catalog.recommended(kind, id, &self.language),
        );

        self.detail = match result {
            Ok((Some(mut item), providers, similar, recommended)) => {
                item.watch_providers = providers;
                let related = related_items(id, similar, recommended);
                DetailState::Ready(DetailRecord { item, related })
            }
            Ok((None, ..)) => DetailState::Error {
                message: "Title details were not found.".to_string(),
            },
            Err(e) => {
                error!(kind = %kind, id = id, error = %e, "Detail fetch failed");
                DetailState::Error {
                    message: format!("An error occurred: {:#}", e),
                }
            }
        };
    }

    /// Close the detail panel.
    pub fn deselect(&mut self) {
        self.detail = DetailState::Closed;
    }

    // ========== Favorites ==========

    /// Toggle a title in the persisted favorites set.
    pub fn toggle_favorite(&mut self, kind: Kind, id: u64) {
        let key = format!("{}:{}", kind.as_str(), id);
        if let Some(position) = self.favorites.iter().position(|k| *k == key) {
            self.favorites.remove(position);
        } else {
            self.favorites.push(key);
        }
        self.persist(KEY_FAVORITES, &self.favorites);
    }

    // ========== Sort & filter ==========

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
    }

    pub fn set_filter(&mut self, filter: FilterOption) {
        self.filter = filter;
    }

    // ========== History ==========

    fn remember_query(&mut self, query: &str) {
        if self.history.iter().any(|q| q == query) {
            return;
        }
        self.history.insert(0, query.to_string());
        self.history.truncate(HISTORY_LIMIT);
        self.persist(KEY_HISTORY, &self.history);
    }

    /// Empty the persisted history log.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist(KEY_HISTORY, &self.history);
    }

    // ========== Chat ==========

    /// Send a chat message. Failures become error-tagged transcript
    /// entries; they never surface as global errors.
    pub async fn send_chat(&mut self, text: &str) {
        let content = text.trim();
        if content.is_empty() {
            return;
        }

        self.chat.push(ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
        });
        self.chat_phase = ChatPhase::Waiting;

        match self.assistant.converse(&self.chat).await {
            Ok(reply) => self.chat.push(ChatMessage {
                role: ChatRole::Assistant,
                content: reply,
            }),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.chat.push(ChatMessage {
                    role: ChatRole::Error,
                    content: CHAT_ERROR.to_string(),
                });
            }
        }
        self.chat_phase = ChatPhase::Idle;
    }

    // ========== Derived state ==========

    /// The displayed list: filtered, sorted, and decorated with the
    /// is-favorited flag. Pure projection; never mutates canonical state.
    pub fn displayed(&self) -> Vec<DisplayItem> {
        derive_display(&self.results, self.sort, self.filter, &self.favorites)
    }

    /// Read-only state for the presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            view: self.view,
            phase: self.phase.clone(),
            results: self.displayed(),
            pagination: self.pagination.clone(),
            sort: self.sort,
            filter: self.filter,
            detail: self.detail.clone(),
            chat: self.chat.clone(),
            chat_phase: self.chat_phase,
            language: self.language.clone(),
            region: self.region.clone(),
            history: self.history.clone(),
        }
    }

    // ========== Internals ==========

    fn fail(&mut self, error: anyhow::Error) {
        error!(error = %error, "Operation failed");
        self.phase = Phase::error(format!("An error occurred: {:#}", error));
    }

    fn persist<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key = key, error = %e, "Failed to persist preference");
        }
    }
}

/// Merge two item lists into a deduplicated set.
///
/// Items keep the position of their first appearance, while a later entry
/// with the same key replaces the earlier entry's fields. Prior items come
/// first, so a re-fetched item stays where the user saw it but shows the
/// newest data.
fn merge_results(prior: Vec<MediaItem>, new_items: Vec<MediaItem>) -> Vec<MediaItem> {
    let mut merged: Vec<MediaItem> = Vec::with_capacity(prior.len() + new_items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in prior.into_iter().chain(new_items) {
        match index.entry(item.key()) {
            Entry::Occupied(slot) => merged[*slot.get()] = item,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

/// Union the similar and recommended listings, deduplicated by numeric id,
/// excluding the subject itself, capped at [`MAX_RELATED`] entries.
fn related_items(
    subject_id: u64,
    similar: Vec<MediaItem>,
    recommended: Vec<MediaItem>,
) -> Vec<MediaItem> {
    let mut merged: Vec<MediaItem> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for item in similar.into_iter().chain(recommended) {
        if item.id == subject_id {
            continue;
        }
        match index.entry(item.id) {
            Entry::Occupied(slot) => merged[*slot.get()] = item,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(item);
            }
        }
    }

    merged.truncate(MAX_RELATED);
    merged
}

/// Filter, stable-sort, and decorate the canonical set for display.
fn derive_display(
    results: &[MediaItem],
    sort: SortOption,
    filter: FilterOption,
    favorites: &[String],
) -> Vec<DisplayItem> {
    let mut items: Vec<MediaItem> = results
        .iter()
        .filter(|item| filter.matches(item.kind))
        .cloned()
        .collect();

    match sort {
        // Missing dates order as earliest possible, so they sink to the end
        SortOption::ReleaseDate => items.sort_by(|a, b| b.release_date.cmp(&a.release_date)),
        SortOption::Rating => items.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average)),
        SortOption::Popularity => items.sort_by(|a, b| b.popularity.total_cmp(&a.popularity)),
    }

    items
        .into_iter()
        .map(|item| {
            let favorited = favorites.iter().any(|key| *key == item.key());
            DisplayItem { item, favorited }
        })
        .collect()
}
