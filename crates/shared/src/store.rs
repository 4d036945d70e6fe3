//! Persistent preference store.
//!
//! A small SQLite-backed key-value table holding JSON-encoded values.
//! Used for the favorites list, search history, and localization settings,
//! which must survive across sessions. The store is opened once at process
//! start and injected into the controller.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Key-value preference store
pub struct PrefStore {
    conn: Connection,
}

impl PrefStore {
    /// Open or create a preference store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_new = !path.exists();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }

        debug!(path = %path.display(), "Opening preference store");

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open preference store at {}", path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create preferences table")?;

        if is_new {
            info!(path = %path.display(), "Created new preference store");
        }

        Ok(Self { conn })
    }

    /// Get a stored value if it exists
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read preference '{}'", key))?;

        match value {
            Some(json) => {
                let data: T = serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse preference '{}'", key))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Get a stored value, falling back to the default when missing or
    /// unreadable
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read preference, using default");
                default
            }
        }
    }

    /// Store a value under the given key, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize preference '{}'", key))?;

        self.conn
            .execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, json],
            )
            .with_context(|| format!("Failed to write preference '{}'", key))?;

        debug!(key = key, "Preference stored");
        Ok(())
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = PrefStore::open(temp_dir.path().join("prefs.db"))?;

        store.set("favorites", &vec!["movie:603".to_string()])?;
        let favorites: Option<Vec<String>> = store.get("favorites")?;
        assert_eq!(favorites, Some(vec!["movie:603".to_string()]));

        Ok(())
    }

    #[test]
    fn test_missing_key_yields_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = PrefStore::open(temp_dir.path().join("prefs.db"))?;

        let history: Vec<String> = store.get_or("history", Vec::new());
        assert!(history.is_empty());
        assert!(!store.contains("history")?);

        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_value() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = PrefStore::open(temp_dir.path().join("prefs.db"))?;

        store.set("language", &"en-US")?;
        store.set("language", &"fr-FR")?;
        let language: Option<String> = store.get("language")?;
        assert_eq!(language.as_deref(), Some("fr-FR"));

        Ok(())
    }

    #[test]
    fn test_survives_reopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("prefs.db");

        {
            let store = PrefStore::open(&path)?;
            store.set("region", &"US")?;
        }

        let store = PrefStore::open(&path)?;
        let region: Option<String> = store.get("region")?;
        assert_eq!(region.as_deref(), Some("US"));

        Ok(())
    }
}
