//! Configuration file parser for ~/.config/devfeed/config.toml.
//!
//! The file is optional: a missing or empty file yields `Config::default()`.
//! Numeric knobs are clamped into sane ranges after parsing rather than
//! rejected, and unknown keys are logged as likely typos.
use crate::api::DEFAULT_BASE_URL;
use crate::feed::FeedSettings;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `dark` or `light`. A stored preference overrides this.
    pub theme: String,

    /// Root of the Forem API, e.g. `https://dev.to/api`.
    pub api_base_url: String,

    /// Articles requested per page.
    pub per_page: u32,

    /// Pages scanned for one free-text search.
    pub search_max_pages: u32,

    pub request_timeout_secs: u64,

    /// Rows from the end of the feed at which the next page is requested.
    pub prefetch_margin: usize,

    pub search_debounce_ms: u64,

    /// Number of tags offered by the tag picker.
    pub tag_list_size: u32,

    /// Article details kept in memory.
    pub article_cache_size: usize,

    /// Reopen the last feed location on start.
    pub restore_session: bool,

    /// Action name to key string, e.g. `reload = "F5"`.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            per_page: 10,
            search_max_pages: 5,
            request_timeout_secs: 15,
            prefetch_margin: 3,
            search_debounce_ms: 1500,
            tag_list_size: 50,
            article_cache_size: 64,
            restore_session: true,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 11] = [
        "theme",
        "api_base_url",
        "per_page",
        "search_max_pages",
        "request_timeout_secs",
        "prefetch_margin",
        "search_debounce_ms",
        "tag_list_size",
        "article_cache_size",
        "restore_session",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Over 1 MB → `Err(ConfigError::TooLarge)`
    /// - Invalid TOML or wrong types → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read.
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text. Blank input yields the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        let config = config.clamped();
        tracing::info!(
            theme = %config.theme,
            api_base_url = %config.api_base_url,
            per_page = config.per_page,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Pull numeric settings into their supported ranges.
    fn clamped(mut self) -> Self {
        let per_page = self.per_page.clamp(1, 1000);
        let search_max_pages = self.search_max_pages.clamp(1, 20);
        let request_timeout_secs = self.request_timeout_secs.clamp(1, 120);

        if per_page != self.per_page
            || search_max_pages != self.search_max_pages
            || request_timeout_secs != self.request_timeout_secs
        {
            tracing::warn!(
                per_page,
                search_max_pages,
                request_timeout_secs,
                "Config values out of range, clamped"
            );
        }

        self.per_page = per_page;
        self.search_max_pages = search_max_pages;
        self.request_timeout_secs = request_timeout_secs;
        self.tag_list_size = self.tag_list_size.clamp(1, 1000);
        self.article_cache_size = self.article_cache_size.max(1);
        self
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            per_page: self.per_page,
            max_search_pages: self.search_max_pages,
            prefetch_margin: self.prefetch_margin,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
