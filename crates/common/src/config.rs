//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Colour scheme preference, persisted as `"dark" | "light"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// The opposite preference
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Parse the stored representation; anything unrecognised is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory backing the persistent key-value store
    pub store_dir: PathBuf,

    /// Filename prefixes for downloads
    pub archive_namespace: String,
    pub image_namespace: String,

    /// Theme used until the user toggles one
    pub default_theme: ThemePreference,

    /// Runtime configuration
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: Self::default_store_dir(),
            archive_namespace: "eduart_imatges".to_string(),
            image_namespace: "saved-image".to_string(),
            default_theme: ThemePreference::Light,
            rust_log: "eduart=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let default_theme = match env::var("EDUART_DEFAULT_THEME") {
            Ok(value) => ThemePreference::parse(&value).ok_or_else(|| {
                anyhow::anyhow!(
                    "EDUART_DEFAULT_THEME must be 'light' or 'dark', got '{}'",
                    value
                )
            })?,
            Err(_) => defaults.default_theme,
        };

        let config = Self {
            store_dir: env::var("EDUART_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            archive_namespace: env::var("EDUART_ARCHIVE_NAMESPACE")
                .unwrap_or(defaults.archive_namespace),
            image_namespace: env::var("EDUART_IMAGE_NAMESPACE")
                .unwrap_or(defaults.image_namespace),
            default_theme,
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };

        if config.archive_namespace.trim().is_empty() || config.image_namespace.trim().is_empty()
        {
            anyhow::bail!("Download namespaces must not be empty");
        }

        Ok(config)
    }

    /// Default store directory (~/.eduart/store/)
    pub fn default_store_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".eduart")
            .join("store")
    }
}
