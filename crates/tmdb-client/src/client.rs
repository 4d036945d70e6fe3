//! TMDb API client with rate limiting.

use crate::error::CatalogError;
use crate::rate_limiter::RateLimiter;
use crate::types::{ListResponse, RawDetails, WatchProvidersResponse};
use crate::Result;
use reqwest::{Client, StatusCode};
use shared::config::TmdbConfig;
use shared::models::{Kind, MediaItem, ProviderInfo};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// TMDb v3 client for searching and fetching movie/series metadata.
///
/// All request methods take `&self`; the rate limiter serializes request
/// admission internally so lookups can be fanned out concurrently.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
    rate_limiter: RateLimiter,
}

impl TmdbClient {
    /// Create a new TMDb client
    pub fn new(
        base_url: String,
        image_base_url: String,
        api_key: String,
        requests_per_second: f64,
        requests_per_minute: u32,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("cinescout/0.1.0")
            .build()
            .map_err(CatalogError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: RateLimiter::new(requests_per_second, requests_per_minute),
        })
    }

    /// Create a client from the configuration section
    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.image_base_url.clone(),
            config.api_key.clone(),
            config.rate_limit.requests_per_second,
            config.rate_limit.requests_per_minute,
        )
    }

    /// Make a GET request with rate limiting
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint = endpoint, "TMDb request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                endpoint: endpoint.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CatalogError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    /// Multi-search for films and series.
    ///
    /// Entries without a poster, and non-media entries such as people, are
    /// filtered out. An empty query yields an empty list without a request.
    pub async fn search(&self, query: &str, page: u32, language: &str) -> Result<Vec<MediaItem>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let page = page.to_string();
        let data: ListResponse = self
            .get(
                "search/multi",
                &[
                    ("query", query),
                    ("page", &page),
                    ("include_adult", "false"),
                    ("language", language),
                ],
            )
            .await?;

        Ok(data.results.into_iter().filter_map(|r| r.into_item()).collect())
    }

    /// Trending films and series of the week.
    pub async fn trending(&self, page: u32, language: &str) -> Result<Vec<MediaItem>> {
        let page = page.to_string();
        let data: ListResponse = self
            .get(
                "trending/all/week",
                &[("page", &page), ("language", language)],
            )
            .await?;

        Ok(data.results.into_iter().filter_map(|r| r.into_item()).collect())
    }

    /// Full details for one title, including its genre list.
    ///
    /// Returns `None` when the title does not exist.
    pub async fn details(
        &self,
        kind: Kind,
        id: u64,
        language: &str,
    ) -> Result<Option<MediaItem>> {
        let endpoint = format!("{}/{}", kind.as_str(), id);
        match self
            .get::<RawDetails>(&endpoint, &[("language", language)])
            .await
        {
            Ok(details) => Ok(Some(details.into_item(kind))),
            Err(CatalogError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Titles similar to the given one. The kind is stamped from the
    /// request since the endpoint does not echo a media type.
    pub async fn similar(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>> {
        let endpoint = format!("{}/{}/similar", kind.as_str(), id);
        let data: ListResponse = self.get(&endpoint, &[("language", language)]).await?;
        Ok(data
            .results
            .into_iter()
            .filter_map(|r| r.into_item_as(kind))
            .collect())
    }

    /// Titles recommended alongside the given one.
    pub async fn recommended(&self, kind: Kind, id: u64, language: &str) -> Result<Vec<MediaItem>> {
        let endpoint = format!("{}/{}/recommendations", kind.as_str(), id);
        let data: ListResponse = self.get(&endpoint, &[("language", language)]).await?;
        Ok(data
            .results
            .into_iter()
            .filter_map(|r| r.into_item_as(kind))
            .collect())
    }

    /// Watch providers for one title in one region.
    ///
    /// The endpoint returns availability for every region at once and takes
    /// no language parameter; an absent region yields `None`.
    pub async fn watch_providers(
        &self,
        kind: Kind,
        id: u64,
        region: &str,
    ) -> Result<Option<ProviderInfo>> {
        let endpoint = format!("{}/{}/watch/providers", kind.as_str(), id);
        match self.get::<WatchProvidersResponse>(&endpoint, &[]).await {
            Ok(mut data) => Ok(data.results.remove(region)),
            Err(CatalogError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Generate a poster URL for the given path.
    pub fn poster_url(&self, path: &str) -> String {
        format!("{}/w500{}", self.image_base_url, path)
    }

    /// Generate a backdrop URL for the given path.
    pub fn backdrop_url(&self, path: &str) -> String {
        format!("{}/w1280{}", self.image_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(
            "https://api.themoviedb.org/3".to_string(),
            "https://image.tmdb.org/t/p".to_string(),
            "test-key".to_string(),
            4.0,
            40,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = TmdbClient::new(
            "https://api.themoviedb.org/3".to_string(),
            "https://image.tmdb.org/t/p".to_string(),
            "   ".to_string(),
            4.0,
            40,
        );
        assert!(matches!(result, Err(CatalogError::MissingApiKey)));
    }

    #[test]
    fn test_poster_url() {
        assert_eq!(
            client().poster_url("/abc123.jpg"),
            "https://image.tmdb.org/t/p/w500/abc123.jpg"
        );
    }

    #[test]
    fn test_backdrop_url() {
        assert_eq!(
            client().backdrop_url("/xyz789.jpg"),
            "https://image.tmdb.org/t/p/w1280/xyz789.jpg"
        );
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let results = client().search("   ", 1, "en-US").await.unwrap();
        assert!(results.is_empty());
    }
}
