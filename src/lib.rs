//! headless-blog: a blog front-end for a headless content API
//!
//! Posts are fetched from a Prismic-compatible content repository, formatted,
//! and rendered with embedded Tera templates into a listing page with
//! "load more" pagination and one page per post.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client::{ContentSource, PrismicClient};
use config::{ApiConfig, SiteConfig};
use helpers::DateFormatter;
use i18n::Labels;

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Content API client shared by every flow
    pub source: Arc<dyn ContentSource>,
    /// Publication date formatting
    pub dates: DateFormatter,
    /// Interface labels
    pub labels: Labels,
}

impl Blog {
    /// Create a blog from a directory, connecting to the content API configured
    /// in the environment
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let api = ApiConfig::from_env()?;
        let client = PrismicClient::new(&api)?;
        tracing::debug!("Using content API at {}", api.endpoint);

        let config = SiteConfig::load_or_default(base_dir.as_ref())?;
        Self::with_source(base_dir, config, Arc::new(client))
    }

    /// Create a blog backed by an arbitrary content source
    pub fn with_source<P: AsRef<Path>>(
        base_dir: P,
        config: SiteConfig,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let dates = DateFormatter::from_config(&config)?;
        let labels = Labels::load(&base_dir, &config.language)?;

        Ok(Self {
            config,
            base_dir,
            public_dir,
            source,
            dates,
            labels,
        })
    }

    /// Listing settings from the site configuration
    pub fn listing_options(&self) -> listing::ListingOptions {
        listing::ListingOptions::from_config(&self.config)
    }

    /// Post page flow over this blog's content source
    pub fn detail_flow(&self) -> detail::DetailFlow {
        detail::DetailFlow::from_config(self.source.clone(), &self.config, self.dates.clone())
    }

    /// Page renderer for this blog
    pub fn page_renderer(&self) -> Result<templates::PageRenderer> {
        templates::PageRenderer::new(&self.config, self.labels.clone())
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }
}
