//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,

    // Directory
    pub public_dir: String,

    // Content types
    pub listing_type: String,
    pub post_type: String,

    // Listing
    pub per_page: usize,

    // Post pages
    pub prerender: Vec<String>,
    pub fallback: Fallback,
    /// Seconds a generated post page stays fresh
    pub revalidate: u64,
    #[serde(default)]
    pub read_time: ReadTimeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),
            date_format: "dd MMM yyyy".to_string(),

            public_dir: "public".to_string(),

            listing_type: "publication".to_string(),
            post_type: "blogpost".to_string(),

            per_page: 5,

            prerender: Vec::new(),
            fallback: Fallback::Blocking,
            revalidate: 60 * 30,
            read_time: ReadTimeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no listing or page request could work with
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            bail!("per_page must be greater than zero");
        }
        Ok(())
    }

    /// Load `_config.yml` from a base directory, falling back to defaults
    pub fn load_or_default<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");
        if config_path.exists() {
            tracing::debug!("Loading site config from {:?}", config_path);
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Revalidation window for generated post pages
    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate)
    }
}

/// How post pages outside the pre-rendered set are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Generate while the request waits
    Blocking,
    /// Answer with a loading page and generate in the background
    Placeholder,
    /// Unknown identifiers are not found
    Disabled,
}

/// Reading-time estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadTimeConfig {
    pub mode: ReadTimeMode,
    pub words_per_minute: u32,
}

impl Default for ReadTimeConfig {
    fn default() -> Self {
        Self {
            mode: ReadTimeMode::Parity,
            words_per_minute: 200,
        }
    }
}

/// Counting strategy for [`ReadTimeConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadTimeMode {
    /// Characters left after removing single spaces, matching already published pages
    Parity,
    /// Whitespace-separated words
    Words,
}
