//! Domain models for CineScout.
//!
//! These are the API-independent types shared between the catalog client,
//! the assistant client, and the view-state controller. Wire formats live
//! in the client crates and are mapped into these types at the boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of items in a full TMDb result page.
///
/// Used to infer whether more pages exist: a page shorter than this is the
/// last one.
pub const PAGE_SIZE: usize = 20;

/// Media category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Kind {
    #[serde(rename = "movie")]
    Film,
    #[serde(rename = "tv")]
    Series,
}

impl Kind {
    /// Wire and key representation (TMDb vocabulary).
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Film => "movie",
            Kind::Series => "tv",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Kind::Film),
            "tv" => Ok(Kind::Series),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Parse a `"movie:603"`-style key into its kind and id.
pub fn parse_key(key: &str) -> Option<(Kind, u64)> {
    let (kind, id) = key.split_once(':')?;
    Some((kind.parse().ok()?, id.parse().ok()?))
}

/// A single piece of media (film or series) from the catalog.
///
/// The pair (kind, id) is the unique key. Watch providers are not part of
/// the catalog listing; they are attached after a secondary lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub kind: Kind,
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub popularity: f64,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    pub watch_providers: Option<ProviderInfo>,
}

impl MediaItem {
    /// Unique key, e.g. `"movie:603"` or `"tv:1399"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

/// Genre entry, present on detail records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Watch-provider availability for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderInfo {
    pub link: String,
    #[serde(default)]
    pub flatrate: Vec<Provider>,
    #[serde(default)]
    pub rent: Vec<Provider>,
    #[serde(default)]
    pub buy: Vec<Provider>,
}

/// A single watch provider (streaming service, rental store, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub provider_id: u64,
    pub provider_name: String,
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: u32,
}

/// A selected item with its related titles attached.
///
/// `related` is the deduplicated union of the similar and recommended
/// listings, capped at 20 entries and never containing the subject itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub item: MediaItem,
    pub related: Vec<MediaItem>,
}

/// Which data source feeds the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Trending,
    Results,
    Favorites,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Trending => write!(f, "trending"),
            View::Results => write!(f, "results"),
            View::Favorites => write!(f, "favorites"),
        }
    }
}

/// Client-side sort selection. A pure projection over the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    Popularity,
    ReleaseDate,
    Rating,
}

impl std::str::FromStr for SortOption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" => Ok(SortOption::Popularity),
            "date" | "release_date" => Ok(SortOption::ReleaseDate),
            "rating" => Ok(SortOption::Rating),
            _ => Err(anyhow::anyhow!("Invalid sort option: {}", s)),
        }
    }
}

/// Client-side kind filter. A pure projection over the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOption {
    All,
    Film,
    Series,
}

impl FilterOption {
    pub fn matches(&self, kind: Kind) -> bool {
        match self {
            FilterOption::All => true,
            FilterOption::Film => kind == Kind::Film,
            FilterOption::Series => kind == Kind::Series,
        }
    }
}

impl std::str::FromStr for FilterOption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterOption::All),
            "movie" => Ok(FilterOption::Film),
            "tv" => Ok(FilterOption::Series),
            _ => Err(anyhow::anyhow!("Invalid filter option: {}", s)),
        }
    }
}

/// Chat message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A supported display language, paired with the region used for
/// watch-provider lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    pub code: &'static str,
    pub region: &'static str,
    pub label: &'static str,
}

/// Languages the catalog is queried in. Each code maps to exactly one region.
pub const SUPPORTED_LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "en-US", region: "US", label: "English (US)" },
    LanguageOption { code: "es-ES", region: "ES", label: "Español (España)" },
    LanguageOption { code: "es-MX", region: "MX", label: "Español (México)" },
    LanguageOption { code: "fr-FR", region: "FR", label: "Français (France)" },
    LanguageOption { code: "de-DE", region: "DE", label: "Deutsch (Deutschland)" },
    LanguageOption { code: "it-IT", region: "IT", label: "Italiano (Italia)" },
    LanguageOption { code: "pt-BR", region: "BR", label: "Português (Brasil)" },
];

/// Look up a supported language by exact code.
pub fn language_option(code: &str) -> Option<&'static LanguageOption> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: Kind, id: u64) -> MediaItem {
        MediaItem {
            kind,
            id,
            title: "Test".to_string(),
            overview: String::new(),
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: None,
            release_date: None,
            popularity: 1.0,
            vote_average: 5.0,
            genres: Vec::new(),
            watch_providers: None,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(item(Kind::Film, 603).key(), "movie:603");
        assert_eq!(item(Kind::Series, 1399).key(), "tv:1399");
    }

    #[test]
    fn test_parse_key_roundtrip() {
        assert_eq!(parse_key("movie:27205"), Some((Kind::Film, 27205)));
        assert_eq!(parse_key("tv:1399"), Some((Kind::Series, 1399)));
        assert_eq!(parse_key("book:1"), None);
        assert_eq!(parse_key("movie:abc"), None);
        assert_eq!(parse_key("movie"), None);
    }

    #[test]
    fn test_kind_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Kind::Film).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&Kind::Series).unwrap(), "\"tv\"");
    }

    #[test]
    fn test_filter_matches() {
        assert!(FilterOption::All.matches(Kind::Film));
        assert!(FilterOption::All.matches(Kind::Series));
        assert!(FilterOption::Film.matches(Kind::Film));
        assert!(!FilterOption::Film.matches(Kind::Series));
        assert!(!FilterOption::Series.matches(Kind::Film));
    }

    #[test]
    fn test_language_lookup() {
        let lang = language_option("fr-FR").unwrap();
        assert_eq!(lang.region, "FR");
        assert!(language_option("xx-XX").is_none());
    }

    #[test]
    fn test_every_language_has_unique_code() {
        for (i, a) in SUPPORTED_LANGUAGES.iter().enumerate() {
            for b in &SUPPORTED_LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
