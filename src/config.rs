//! User configuration and preferences

use crate::error::{Result, SwipeError};
use crate::provider::{DEFAULT_FALLBACK_URL, DEFAULT_SOURCE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DECK_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Number of cards per round
    pub deck_size: usize,
    /// Image source; a unique query is appended per card
    pub source_url: String,
    /// Image used when a fetch fails
    pub fallback_url: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            deck_size: DEFAULT_DECK_SIZE,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
        }
    }
}

impl UserConfig {
    /// Get the config file path (~/.config/catswp/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catswp").join("config.json"))
    }

    /// Load config from file, or create default if doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            SwipeError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            SwipeError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            SwipeError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            SwipeError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SwipeError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SwipeError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            SwipeError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}
