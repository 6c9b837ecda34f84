//! Proxy configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! base_url = "http://localhost:8000/fixtures/"
//!
//! [tracker]
//! count_mode = "per_wave"
//! ```

use crate::error::ProxyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How `total_count` accumulates across repeated use of one tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Count every request ever created through the proxy
    #[default]
    Cumulative,
    /// Count only requests created since pending last dropped to zero
    PerWave,
}

/// Completion tracker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Accumulation of the reported total
    pub count_mode: CountMode,
}

impl TrackerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With count mode
    #[inline]
    #[must_use]
    pub fn with_count_mode(mut self, count_mode: CountMode) -> Self {
        self.count_mode = count_mode;
        self
    }
}

/// Settings for building both proxies
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base location relative locators resolve against
    pub base_url: Option<String>,
    /// Completion tracker settings
    pub tracker: TrackerConfig,
}

impl ProxyConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base url
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// With tracker settings
    #[inline]
    #[must_use]
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// - `ProxyError::Config` on malformed TOML or unknown values
    pub fn from_toml_str(text: &str) -> Result<Self, ProxyError> {
        Ok(toml::from_str(text)?)
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// - `ProxyError::Io` if the file cannot be read
    /// - `ProxyError::Config` on malformed content
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
