//! Application configuration for docdex.
//!
//! User config lives at `~/.docdex/docdex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocdexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docdex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docdex";

// ---------------------------------------------------------------------------
// Config structs (matching docdex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Crawl limits.
    #[serde(default)]
    pub crawl: CrawlSectionConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheSectionConfig,

    /// Enabled documentation sources.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding per-source index artifacts.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Default maximum results per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_results: default_max_results(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.docdex/data".into()
}
fn default_max_results() -> usize {
    10
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSectionConfig {
    /// Global cap on retained pages per crawl.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Inclusive ceiling on traversal depth from each seed.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Politeness delay between successive fetches.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlSectionConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_max_pages() -> usize {
    500
}
fn default_max_depth() -> u32 {
    3
}
fn default_rate_limit() -> u64 {
    150
}
fn default_timeout() -> u64 {
    30
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSectionConfig {
    /// How long a cached response stays live.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached responses.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheSectionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    3600
}
fn default_cache_capacity() -> usize {
    1000
}

/// `[[sources]]` entry — a documentation source enabled in this install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Source identifier matching a registered adapter (e.g. "wpilib").
    pub id: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Versions whose artifacts should be loaded at query time.
    #[serde(default = "default_versions")]
    pub versions: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_versions() -> Vec<String> {
    vec!["2025".into()]
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl bounds handed to the index builder.
#[derive(Debug, Clone)]
pub struct CrawlLimits {
    /// Global cap on retained pages.
    pub max_pages: usize,
    /// Inclusive ceiling on traversal depth.
    pub max_depth: u32,
    /// Politeness delay between fetches.
    pub rate_limit: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional wall-clock bound on the whole crawl. `None` leaves the page
    /// and depth caps as the only bounds.
    pub deadline: Option<Duration>,
}

impl From<&AppConfig> for CrawlLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_pages: config.crawl.max_pages,
            max_depth: config.crawl.max_depth,
            rate_limit: Duration::from_millis(config.crawl.rate_limit_ms),
            timeout: Duration::from_secs(config.crawl.timeout_secs),
            deadline: None,
        }
    }
}

/// Runtime cache settings handed to the page fetcher.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub capacity: usize,
    pub timeout: Duration,
}

impl From<&AppConfig> for CacheSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.cache.ttl_secs),
            capacity: config.cache.capacity,
            timeout: Duration::from_secs(config.crawl.timeout_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docdex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocdexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docdex/docdex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve the configured data directory, expanding a leading `~`.
pub fn data_dir(config: &AppConfig) -> Result<PathBuf> {
    let raw = &config.defaults.data_dir;
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| DocdexError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(raw))
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocdexError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocdexError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocdexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocdexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocdexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("max_pages"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawl.max_depth, 3);
        assert_eq!(parsed.cache.ttl_secs, 3600);
    }

    #[test]
    fn config_with_sources() {
        let toml_str = r#"
[defaults]
data_dir = "/tmp/docdex"

[[sources]]
id = "wpilib"
versions = ["2025", "2024"]

[[sources]]
id = "rev"
enabled = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].versions, vec!["2025", "2024"]);
        assert!(config.sources[0].enabled);
        assert!(!config.sources[1].enabled);
    }

    #[test]
    fn crawl_limits_from_app_config() {
        let app = AppConfig::default();
        let limits = CrawlLimits::from(&app);
        assert_eq!(limits.max_pages, 500);
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.rate_limit, Duration::from_millis(150));
        assert!(limits.deadline.is_none());
    }

    #[test]
    fn data_dir_expands_home() {
        let config = AppConfig::default();
        let dir = data_dir(&config).expect("resolve data dir");
        assert!(dir.is_absolute());
        assert!(dir.ends_with(".docdex/data"));
    }
}
