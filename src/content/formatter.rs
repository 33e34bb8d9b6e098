//! Post formatter - raw API records to display-ready posts

use serde_json::Value;

use super::rich_text::{as_html, as_text};
use super::{Banner, ContentSection, DetailData, Post, PostData, PostDetail};
use crate::client::RawRecord;
use crate::helpers::DateFormatter;

/// Separator used when flattening multi-block rich text
const TEXT_SEPARATOR: &str = " ";

/// Format a listing record
pub fn format_post(raw: &RawRecord, dates: &DateFormatter) -> Post {
    Post {
        uid: raw.uid.clone(),
        first_publication_date: dates.format(raw.first_publication_date.as_deref()),
        data: PostData {
            title: text_field(raw, "title"),
            subtitle: text_field(raw, "subtitle"),
            author: text_field(raw, "author"),
        },
    }
}

/// Format a page of listing records, keeping their order
pub fn format_page(raws: &[RawRecord], dates: &DateFormatter) -> Vec<Post> {
    raws.iter().map(|raw| format_post(raw, dates)).collect()
}

/// Format a record for its own page
pub fn format_detail(raw: &RawRecord, dates: &DateFormatter) -> PostDetail {
    let banner_url = raw
        .data
        .get("banner")
        .and_then(|b| b.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_else(|| {
            tracing::debug!("Post {:?} has no banner", raw.uid);
            ""
        });

    let content = match raw.data.get("content") {
        Some(Value::Array(groups)) => groups
            .iter()
            .map(|group| ContentSection {
                heading: as_text(group.get("heading").unwrap_or(&Value::Null), TEXT_SEPARATOR),
                body: as_html(group.get("body").unwrap_or(&Value::Null)),
            })
            .collect(),
        _ => {
            tracing::debug!("Post {:?} has no content sections", raw.uid);
            Vec::new()
        }
    };

    PostDetail {
        uid: raw.uid.clone(),
        first_publication_date: dates.format(raw.first_publication_date.as_deref()),
        last_publication_date: dates.format(raw.last_publication_date.as_deref()),
        data: DetailData {
            title: text_field(raw, "title"),
            subtitle: text_field(raw, "subtitle"),
            author: text_field(raw, "author"),
            banner: Banner {
                url: banner_url.to_string(),
            },
            content,
        },
    }
}

/// Flatten a text field, empty when absent
fn text_field(raw: &RawRecord, field: &str) -> String {
    match raw.data.get(field) {
        Some(value) => as_text(value, TEXT_SEPARATOR),
        None => {
            tracing::debug!("Record {:?} has no {} field", raw.id, field);
            String::new()
        }
    }
}
