use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheTtl, ResponseCache};
use crate::catalog::DEFAULT_BASE_URL;

/// Application configuration loaded from ~/.config/bookbrowse/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Where and how to query the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Results per page when --limit is not given
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Query used when the search query is empty
    #[serde(default = "default_query")]
    pub default_query: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    8
}

fn default_query() -> String {
    "fantasy".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("bookbrowse/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            default_query: default_query(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Staleness window for search pages (default: 5 minutes)
    #[serde(default = "default_search_ttl_secs")]
    pub search_ttl_secs: u64,

    /// Staleness window for work details (default: 1 hour)
    #[serde(default = "default_work_ttl_secs")]
    pub work_ttl_secs: u64,

    /// Override for the cache directory
    pub dir: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_search_ttl_secs() -> u64 {
    5 * 60
}

fn default_work_ttl_secs() -> u64 {
    60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            search_ttl_secs: default_search_ttl_secs(),
            work_ttl_secs: default_work_ttl_secs(),
            dir: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> CacheTtl {
        CacheTtl {
            search: Duration::from_secs(self.search_ttl_secs),
            work: Duration::from_secs(self.work_ttl_secs),
        }
    }

    /// Configured directory, or the platform cache directory
    pub fn dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => ResponseCache::default_dir(),
        }
    }
}

impl Config {
    /// Load configuration from `path` if given, else from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::config_path()?),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("bookbrowse").join("config.toml"))
    }

    /// Get the page size, with CLI override taking precedence
    pub fn page_size(&self, cli_override: Option<u32>) -> u32 {
        cli_override.unwrap_or(self.catalog.page_size).max(1)
    }

    /// Get the query to run, falling back to the default for blank input
    pub fn query(&self, cli_query: Option<&str>) -> String {
        match cli_query.map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.catalog.default_query.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.catalog.base_url, "https://openlibrary.org");
        assert_eq!(config.catalog.page_size, 8);
        assert!(config.cache.enabled);
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[catalog]
base_url = "http://localhost:8080"
page_size = 20

[cache]
enabled = false
dir = "/tmp/bookbrowse-cache"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.catalog.base_url, "http://localhost:8080");
        assert_eq!(config.catalog.page_size, 20);
        // Unset keys keep their defaults
        assert_eq!(config.catalog.default_query, "fantasy");
        assert!(!config.cache.enabled);
        assert_eq!(
            config.cache.dir().unwrap(),
            PathBuf::from("/tmp/bookbrowse-cache")
        );
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[catalog]\npage_size = \"eight\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_cli_override() {
        let config = Config::default();

        // CLI override takes precedence
        assert_eq!(config.page_size(Some(20)), 20);
        assert_eq!(config.query(Some("dune")), "dune");

        // Falls back to config when no CLI override
        assert_eq!(config.page_size(None), 8);
        assert_eq!(config.query(None), "fantasy");
        assert_eq!(config.query(Some("   ")), "fantasy");
    }

    #[test]
    fn test_cache_ttl_defaults() {
        let ttl = Config::default().cache.ttl();
        assert_eq!(ttl.search, Duration::from_secs(300));
        assert_eq!(ttl.work, Duration::from_secs(3600));
        assert_eq!(ttl, CacheTtl::default());
    }
}
