//! Clean the public directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;

/// Delete the public directory of the site in `base_dir`
///
/// Needs no content API credentials.
pub fn run(base_dir: &Path) -> Result<()> {
    let config = SiteConfig::load_or_default(base_dir)?;
    let public_dir = base_dir.join(&config.public_dir);

    if public_dir.exists() {
        fs::remove_dir_all(&public_dir)?;
        tracing::info!("Deleted: {:?}", public_dir);
    }

    Ok(())
}
