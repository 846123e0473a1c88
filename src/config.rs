//! Configuration management for marquee
//!
//! Handles config file loading/saving and API key management.
//! Config is stored at ~/.config/marquee/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::images::IMAGE_BASE_URL;
use crate::api::{omdb, tmdb};
use crate::xref;

pub const TMDB_KEY_ENV: &str = "TMDB_API_KEY";
pub const OMDB_KEY_ENV: &str = "OMDB_API_KEY";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API key or read-access token
    pub tmdb_api_key: Option<String>,
    /// Cross-reference API key; lookups are disabled without it
    pub omdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub omdb_base_url: String,
    pub image_base_url: String,
    /// Per-request timeout for both upstream APIs
    pub request_timeout_secs: u64,
    /// Maximum cached cross-reference lookups
    pub xref_cache_capacity: u64,
    /// Re-query cached lookups after this many days; unset means never
    pub xref_recheck_days: Option<u64>,
    /// Ceiling on simultaneous cross-reference calls
    pub xref_max_concurrency: usize,
    /// Response language sent to the catalog API
    pub language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            omdb_api_key: None,
            tmdb_base_url: tmdb::DEFAULT_BASE_URL.to_string(),
            omdb_base_url: omdb::DEFAULT_BASE_URL.to_string(),
            image_base_url: IMAGE_BASE_URL.to_string(),
            request_timeout_secs: 15,
            xref_cache_capacity: xref::DEFAULT_CAPACITY,
            xref_recheck_days: None,
            xref_max_concurrency: xref::DEFAULT_MAX_CONCURRENCY,
            language: Some("en-US".to_string()),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/marquee/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("marquee").join("config.toml"))
    }

    /// Load config from the default path with environment overrides, or
    /// defaults if the file is missing or unreadable
    pub fn load() -> Self {
        let mut config = Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default();
        config.apply_env();
        config
    }

    /// Load config from a specific file without environment overrides
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) {
        if let Some(key) = env_key(TMDB_KEY_ENV) {
            self.tmdb_api_key = Some(key);
        }
        if let Some(key) = env_key(OMDB_KEY_ENV) {
            self.omdb_api_key = Some(key);
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    pub fn xref_recheck_after(&self) -> Option<Duration> {
        self.xref_recheck_days
            .filter(|d| *d > 0)
            .map(|d| Duration::from_secs(d * 24 * 60 * 60))
    }

    pub fn has_tmdb_key(&self) -> bool {
        self.tmdb_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.tmdb_api_key.is_none());
        assert!(config.omdb_api_key.is_none());
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.xref_recheck_after(), None);
        assert!(!config.has_tmdb_key());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            omdb_api_key = "abc123"
            xref_recheck_days = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.omdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(
            config.xref_recheck_after(),
            Some(Duration::from_secs(7 * 86400))
        );
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.language.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            tmdb_api_key: Some("k".into()),
            xref_max_concurrency: 2,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }
}
