//! Client seams between the controller and the remote services.
//!
//! The controller talks to the catalog and the assistant through these
//! traits so tests can substitute scripted implementations. The production
//! implementations delegate to the client crates.

use anyhow::Result;
use async_trait::async_trait;
use shared::models::{ChatMessage, Kind, MediaItem, ProviderInfo};

/// Media catalog operations the controller depends on.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Keyword/multi search, filtered to films and series with posters.
    async fn search(&self, query: &str, page: u32, language: &str) -> Result<Vec<MediaItem>>;

    /// Trending listing, same filter.
    async fn trending(&self, page: u32, language: &str) -> Result<Vec<MediaItem>>;

    /// Full details for one title; `None` when it does not exist.
    async fn details(&self, kind: Kind, id: u64, language: &str) -> Result<Option<MediaItem>>;

    /// Similar titles.
    async fn similar(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>>;

    /// Recommended titles.
    async fn recommended(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>>;

    /// Watch providers for one title in one region.
    async fn watch_providers(
        &self,
        kind: Kind,
        id: u64,
        region: &str,
    ) -> Result<Option<ProviderInfo>>;
}

/// Query-interpretation operations the controller depends on.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Normalize a free-text query into a catalog search string.
    async fn interpret(&self, literal_query: &str) -> Result<String>;

    /// Continue the conversation; error-tagged entries are ignored.
    async fn converse(&self, transcript: &[ChatMessage]) -> Result<String>;
}

#[async_trait]
impl Catalog for tmdb_client::TmdbClient {
    async fn search(&self, query: &str, page: u32, language: &str) -> Result<Vec<MediaItem>> {
        Ok(tmdb_client::TmdbClient::search(self, query, page, language).await?)
    }

    async fn trending(&self, page: u32, language: &str) -> Result<Vec<MediaItem>> {
        Ok(tmdb_client::TmdbClient::trending(self, page, language).await?)
    }

    async fn details(&self, kind: Kind, id: u64, language: &str) -> Result<Option<MediaItem>> {
        Ok(tmdb_client::TmdbClient::details(self, kind, id, language).await?)
    }

    async fn similar(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>> {
        Ok(tmdb_client::TmdbClient::similar(self, kind, id, language).await?)
    }

    async fn recommended(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>> {
        Ok(tmdb_client::TmdbClient::recommended(self, kind, id, language).await?)
    }

    async fn watch_providers(
        &self,
        kind: Kind,
        id: u64,
        region: &str,
    ) -> Result<Option<ProviderInfo>> {
        Ok(tmdb_client::TmdbClient::watch_providers(self, kind, id, region).await?)
    }
}

#[async_trait]
impl Assistant for assistant::AssistantClient {
    async fn interpret(&self, literal_query: &str) -> Result<String> {
        let plan = assistant::AssistantClient::interpret(self, literal_query).await?;
        Ok(plan.search_query)
    }

    async fn converse(&self, transcript: &[ChatMessage]) -> Result<String> {
        assistant::AssistantClient::converse(self, transcript).await
    }
}
