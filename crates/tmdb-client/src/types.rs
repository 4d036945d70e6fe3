//! TMDb v3 response types.
//!
//! These types represent the JSON responses from the TMDb API and are
//! mapped into the domain models at the crate boundary. Listing entries
//! are filtered to films and series that carry a poster; everything else
//! (people, posterless entries) is dropped.

use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{Genre, Kind, MediaItem, ProviderInfo};
use std::collections::HashMap;

/// Paged listing envelope (`search/multi`, `trending`, `similar`, ...)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub results: Vec<RawEntry>,
}

/// One entry of a listing response.
///
/// `search/multi` and `trending/all` tag entries with a `media_type`
/// (which may be `person`); the per-title listings (`similar`,
/// `recommendations`) do not, so the kind is stamped from the request.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawEntry {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

impl RawEntry {
    fn kind(&self) -> Option<Kind> {
        match self.media_type.as_deref() {
            Some("movie") => Some(Kind::Film),
            Some("tv") => Some(Kind::Series),
            _ => None,
        }
    }

    /// Convert a tagged entry, dropping non-media kinds and posterless
    /// entries.
    pub fn into_item(self) -> Option<MediaItem> {
        let kind = self.kind()?;
        self.into_item_as(kind)
    }

    /// Convert an untagged entry with the kind taken from the request,
    /// dropping posterless entries.
    pub fn into_item_as(self, kind: Kind) -> Option<MediaItem> {
        self.poster_path.as_ref()?;
        Some(MediaItem {
            kind,
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: parse_date(self.release_date.as_deref())
                .or_else(|| parse_date(self.first_air_date.as_deref())),
            popularity: self.popularity,
            vote_average: self.vote_average,
            genres: Vec::new(),
            watch_providers: None,
        })
    }
}

/// Detail response for a single film or series.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl RawDetails {
    /// Convert a detail response; the kind comes from the request path.
    pub fn into_item(self, kind: Kind) -> MediaItem {
        MediaItem {
            kind,
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: parse_date(self.release_date.as_deref())
                .or_else(|| parse_date(self.first_air_date.as_deref())),
            popularity: self.popularity,
            vote_average: self.vote_average,
            genres: self.genres,
            watch_providers: None,
        }
    }
}

/// Watch-provider envelope, keyed by region code.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, ProviderInfo>,
}

/// Parse a TMDb date string; empty or malformed dates are dropped.
fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(media_type: Option<&str>, poster: Option<&str>) -> RawEntry {
        RawEntry {
            id: 603,
            media_type: media_type.map(|s| s.to_string()),
            title: Some("The Matrix".to_string()),
            name: None,
            overview: Some("A hacker learns the truth.".to_string()),
            poster_path: poster.map(|s| s.to_string()),
            backdrop_path: None,
            release_date: Some("1999-03-31".to_string()),
            first_air_date: None,
            vote_average: 8.2,
            popularity: 81.4,
        }
    }

    #[test]
    fn test_person_entries_are_dropped() {
        assert!(entry(Some("person"), Some("/p.jpg")).into_item().is_none());
        assert!(entry(None, Some("/p.jpg")).into_item().is_none());
    }

    #[test]
    fn test_posterless_entries_are_dropped() {
        assert!(entry(Some("movie"), None).into_item().is_none());
    }

    #[test]
    fn test_movie_entry_converts() {
        let item = entry(Some("movie"), Some("/p.jpg")).into_item().unwrap();
        assert_eq!(item.kind, Kind::Film);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(
            item.release_date,
            NaiveDate::from_ymd_opt(1999, 3, 31)
        );
    }

    #[test]
    fn test_series_falls_back_to_name_and_air_date() {
        let raw = RawEntry {
            id: 1399,
            media_type: Some("tv".to_string()),
            title: None,
            name: Some("Game of Thrones".to_string()),
            overview: None,
            poster_path: Some("/got.jpg".to_string()),
            backdrop_path: None,
            release_date: None,
            first_air_date: Some("2011-04-17".to_string()),
            vote_average: 8.4,
            popularity: 300.0,
        };
        let item = raw.into_item().unwrap();
        assert_eq!(item.kind, Kind::Series);
        assert_eq!(item.title, "Game of Thrones");
        assert_eq!(item.release_date, NaiveDate::from_ymd_opt(2011, 4, 17));
    }

    #[test]
    fn test_stamped_kind_ignores_media_type() {
        let item = entry(None, Some("/p.jpg")).into_item_as(Kind::Series).unwrap();
        assert_eq!(item.kind, Kind::Series);
    }

    #[test]
    fn test_parse_date_rejects_empty_and_garbage() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("not-a-date")), None);
        assert!(parse_date(Some("2020-01-02")).is_some());
    }
}
