//! Generator module - writes the listing and pre-rendered posts as static HTML

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detail::DetailFlow;
use crate::helpers::path_segment;
use crate::listing::Listing;
use crate::templates::{PageRenderer, LOGO, STYLESHEET};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub listed_posts: usize,
    pub post_pages: usize,
}

/// Static site generator
pub struct Generator<'a> {
    blog: &'a Blog,
    renderer: PageRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog) -> Result<Self> {
        Ok(Self {
            blog,
            renderer: blog.page_renderer()?,
        })
    }

    /// Generate the entire site
    ///
    /// Post pages named in `prerender` are generated through `detail`, which
    /// keeps them for later requests.
    pub async fn generate(&self, detail: &DetailFlow) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.write_assets()?;

        let listing = Listing::load(
            self.blog.source.as_ref(),
            &self.blog.listing_options(),
            &self.blog.dates,
        )
        .await?;
        let html = self.renderer.render_listing(&listing)?;
        write_page(&self.blog.public_dir.join("index.html"), &html)?;

        let details = detail.prerender(&self.blog.config.prerender).await?;
        for post in &details {
            let Some(uid) = post.uid.as_deref() else {
                continue;
            };
            let html = self.renderer.render_post(post)?;
            write_page(&self.post_output_path(uid), &html)?;
        }

        Ok(GenerateSummary {
            listed_posts: listing.posts().len(),
            post_pages: details.len(),
        })
    }

    /// Write the embedded stylesheet and logo
    fn write_assets(&self) -> Result<()> {
        write_page(&self.blog.public_dir.join("css").join("style.css"), STYLESHEET)?;
        write_page(&self.blog.public_dir.join("images").join("logo.svg"), LOGO)?;
        Ok(())
    }

    fn post_output_path(&self, uid: &str) -> PathBuf {
        // Percent-encoding leaves `.` and `..` intact
        let segment = match path_segment(uid) {
            s if s == "." || s == ".." => s.replace('.', "%2E"),
            s => s,
        };
        self.blog
            .public_dir
            .join("post")
            .join(segment)
            .join("index.html")
    }
}

fn write_page(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}
