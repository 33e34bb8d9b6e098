//! Content module - post models, rich text and formatting

mod formatter;
mod post;
pub mod rich_text;

pub use formatter::{format_detail, format_page, format_post};
pub use post::{Banner, ContentSection, DetailData, Post, PostData, PostDetail};
