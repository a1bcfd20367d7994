//! Configuration management for prompt-rewind.
//!
//! Handles:
//! - History size limits
//! - Search key bindings
//! - Boilerplate prompt patterns
//! - Sessions root override

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RewindError};
use crate::history::HistoryLimits;
use crate::parser::{PromptFilter, DEFAULT_BOILERPLATE_PATTERNS};
use crate::search::{KeyBinding, SearchKeys};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// History size limits.
    #[serde(default)]
    pub history: HistoryLimits,
    /// Reverse search keys.
    #[serde(default)]
    pub search: SearchConfig,
    /// Prompt filtering.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Session log location.
    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Project-specific configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = ".prompt-rewind.toml";

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Ok(config_path) if config_path.exists() => Self::load_from(&config_path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration with project-specific overrides.
    ///
    /// Searches for `.prompt-rewind.toml` in the given project directory
    /// and merges it with the global configuration.
    pub fn load_for_project(project_dir: &Path) -> Result<Self> {
        let mut config = Self::load()?;

        let project_config_path = project_dir.join(PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            let project_config = Self::load_from(&project_config_path)?;
            config.merge_from(&project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RewindError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| RewindError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.search.keys()?;
        if self.history.max_entries == 0 {
            return Err(RewindError::config("history.max_entries must be at least 1"));
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge_from(&mut self, other: &Config) {
        let defaults = Config::default();

        if other.history.max_entries != defaults.history.max_entries {
            self.history.max_entries = other.history.max_entries;
        }
        if other.history.cross_file_budget != defaults.history.cross_file_budget {
            self.history.cross_file_budget = other.history.cross_file_budget;
        }
        if other.history.tail_bytes != defaults.history.tail_bytes {
            self.history.tail_bytes = other.history.tail_bytes;
        }

        if other.search.hotkey != defaults.search.hotkey {
            self.search.hotkey = other.search.hotkey.clone();
        }
        if other.search.cancel_key != defaults.search.cancel_key {
            self.search.cancel_key = other.search.cancel_key.clone();
        }

        if other.filter.boilerplate_patterns != defaults.filter.boilerplate_patterns {
            self.filter.boilerplate_patterns = other.filter.boilerplate_patterns.clone();
        }

        if other.sessions.directory.is_some() {
            self.sessions.directory = other.sessions.directory.clone();
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RewindError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })
    }
}

/// Reverse search key configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Starts search and cycles matches.
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    /// Cancels search. Escape always cancels as well.
    #[serde(default = "default_cancel_key")]
    pub cancel_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
            cancel_key: default_cancel_key(),
        }
    }
}

impl SearchConfig {
    /// Parse the configured key specs.
    pub fn keys(&self) -> Result<SearchKeys> {
        Ok(SearchKeys {
            hotkey: self.hotkey.parse::<KeyBinding>()?,
            cancel: self.cancel_key.parse::<KeyBinding>()?,
        })
    }
}

/// Prompt filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Prompts whose trimmed text matches any of these are dropped.
    #[serde(default = "default_boilerplate_patterns")]
    pub boilerplate_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            boilerplate_patterns: default_boilerplate_patterns(),
        }
    }
}

impl FilterConfig {
    /// Build the prompt filter.
    #[must_use]
    pub fn build(&self) -> PromptFilter {
        PromptFilter::from_patterns(&self.boilerplate_patterns)
    }
}

/// Session log location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionsConfig {
    /// Sessions root override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_hotkey() -> String {
    "ctrl+r".to_string()
}

fn default_cancel_key() -> String {
    "ctrl+g".to_string()
}

fn default_boilerplate_patterns() -> Vec<String> {
    DEFAULT_BOILERPLATE_PATTERNS
        .iter()
        .map(|p| (*p).to_string())
        .collect()
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| RewindError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("prompt-rewind").join("config.toml"))
}
