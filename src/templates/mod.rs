//! Built-in templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{ReadTimeConfig, SiteConfig};
use crate::content::{ContentSection, Post, PostDetail};
use crate::helpers::{estimate_minutes, html_escape, listing_path};
use crate::i18n::Labels;
use crate::listing::{Listing, MAX_PAGES};

/// Stylesheet written to `css/style.css`
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Logo written to `images/logo.svg`
pub const LOGO: &str = include_str!("theme/logo.svg");

/// Seconds before a loading page reloads itself
const LOADING_REFRESH_SECONDS: u32 = 2;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escaping is explicit through `escape_html`; bodies are already HTML.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            ("message.html", include_str!("theme/message.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
        ])?;

        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape HTML special characters
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let escaped = match value {
        tera::Value::Null => String::new(),
        tera::Value::String(s) => html_escape(s),
        other => html_escape(&other.to_string()),
    };
    Ok(tera::Value::String(escaped))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub path: Option<String>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            date: post.first_publication_date.clone(),
            path: post.path(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub author: String,
    pub date: Option<String>,
    pub edited_on: Option<String>,
    pub banner: String,
    pub read_minutes: u32,
    pub content: Vec<ContentSection>,
}

impl PostPageData {
    pub fn new(detail: &PostDetail, read_time: &ReadTimeConfig) -> Self {
        Self {
            title: detail.data.title.clone(),
            author: detail.data.author.clone(),
            date: detail.first_publication_date.clone(),
            edited_on: if detail.was_edited() {
                detail.last_publication_date.clone()
            } else {
                None
            },
            banner: detail.data.banner.url.clone(),
            read_minutes: estimate_minutes(&detail.data.content, read_time),
            content: detail.data.content.clone(),
        }
    }
}

/// Renders the site's pages
pub struct PageRenderer {
    renderer: TemplateRenderer,
    site: SiteData,
    labels: Labels,
    read_time: ReadTimeConfig,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, labels: Labels) -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
            site: SiteData {
                title: config.title.clone(),
                language: config.language.clone(),
            },
            labels,
            read_time: config.read_time.clone(),
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("labels", &self.labels);
        context
    }

    /// Render the listing; the load-more link only appears while a cursor is
    /// held and the view is below [`MAX_PAGES`]
    pub fn render_listing(&self, listing: &Listing) -> Result<String> {
        let posts: Vec<PostSummary> = listing.posts().iter().map(PostSummary::from).collect();
        let load_more = (listing.can_load_more() && listing.pages() < MAX_PAGES)
            .then(|| listing_path(listing.pages() + 1));

        let mut context = self.create_base_context();
        context.insert("posts", &posts);
        context.insert("load_more", &load_more);
        self.renderer.render("index.html", &context)
    }

    pub fn render_post(&self, detail: &PostDetail) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("post", &PostPageData::new(detail, &self.read_time));
        self.renderer.render("post.html", &context)
    }

    /// Placeholder shown while a post is generated
    pub fn render_loading(&self) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("refresh_seconds", &LOADING_REFRESH_SECONDS);
        self.renderer.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render_message(&self.labels.not_found)
    }

    pub fn render_fetch_failed(&self) -> Result<String> {
        self.render_message(&self.labels.fetch_failed)
    }

    fn render_message(&self, message: &str) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("message", message);
        self.renderer.render("message.html", &context)
    }
}
