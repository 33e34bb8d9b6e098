//! Structured rich text - flattening to plain text and rendering to HTML
//!
//! Rich text arrives as an array of blocks:
//!
//! ```json
//! [{ "type": "paragraph", "text": "Hello world", "spans": [
//!     { "start": 0, "end": 5, "type": "strong" }
//! ]}]
//! ```
//!
//! Span offsets count UTF-16 code units. A plain JSON string (a key-text field)
//! is accepted wherever rich text is.

use serde_json::Value;

use crate::helpers::html_escape;

/// Flatten rich text to plain text, joining blocks with `separator`
pub fn as_text(value: &Value, separator: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(separator),
        _ => String::new(),
    }
}

/// Render rich text to HTML
pub fn as_html(value: &Value) -> String {
    let blocks = match value {
        Value::String(s) => return format!("<p>{}</p>", render_text(s, &[])),
        Value::Array(blocks) => blocks,
        _ => return String::new(),
    };

    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let kind = block.get("type").and_then(Value::as_str).unwrap_or("");

        let list = match kind {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };
        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        match render_block(kind, block) {
            Some(rendered) => html.push_str(&rendered),
            None => tracing::debug!("Skipping unsupported rich text block {:?}", kind),
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(kind: &str, block: &Value) -> Option<String> {
    let text = || {
        let text = block.get("text").and_then(Value::as_str).unwrap_or("");
        let spans = block
            .get("spans")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        render_text(text, spans)
    };

    let html = match kind {
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &kind["heading".len()..];
            format!("<h{}>{}</h{}>", level, text(), level)
        }
        "paragraph" => format!("<p>{}</p>", text()),
        "preformatted" => format!("<pre>{}</pre>", text()),
        "list-item" | "o-list-item" => format!("<li>{}</li>", text()),
        "image" => {
            let url = block.get("url").and_then(Value::as_str).unwrap_or("");
            let alt = block.get("alt").and_then(Value::as_str).unwrap_or("");
            format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(url),
                html_escape(alt)
            )
        }
        "embed" => {
            let oembed = block.get("oembed")?;
            let field = |name: &str| oembed.get(name).and_then(Value::as_str).unwrap_or("");
            format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(field("embed_url")),
                html_escape(field("type")),
                html_escape(field("provider_name")),
                field("html")
            )
        }
        _ => return None,
    };

    Some(html)
}

/// A span resolved to byte offsets
#[derive(Debug, Clone, PartialEq)]
struct Markup {
    start: usize,
    end: usize,
    open: String,
    close: &'static str,
}

fn markup_for(span: &Value, text: &str) -> Option<Markup> {
    let start = span.get("start").and_then(Value::as_u64)? as usize;
    let end = span.get("end").and_then(Value::as_u64)? as usize;
    let data = span.get("data");
    let data_str = |name: &str| {
        data.and_then(|d| d.get(name))
            .and_then(Value::as_str)
            .unwrap_or("")
    };

    let (open, close) = match span.get("type").and_then(Value::as_str)? {
        "strong" => ("<strong>".to_string(), "</strong>"),
        "em" => ("<em>".to_string(), "</em>"),
        "hyperlink" => {
            let target = if data_str("target") == "_blank" {
                r#" target="_blank" rel="noopener""#
            } else {
                ""
            };
            (
                format!(r#"<a href="{}"{}>"#, html_escape(data_str("url")), target),
                "</a>",
            )
        }
        "label" => (
            format!(r#"<span class="{}">"#, html_escape(data_str("label"))),
            "</span>",
        ),
        _ => return None,
    };

    let start = utf16_to_byte(text, start);
    let end = utf16_to_byte(text, end);
    if start >= end {
        return None;
    }

    Some(Markup {
        start,
        end,
        open,
        close,
    })
}

/// Byte offset of a UTF-16 offset, clamped to the text
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, c) in text.char_indices() {
        if units >= offset {
            return byte;
        }
        units += c.len_utf16();
    }
    text.len()
}

/// Render text with its spans, keeping tags properly nested
fn render_text(text: &str, spans: &[Value]) -> String {
    let mut markups: Vec<Markup> = spans
        .iter()
        .filter_map(|span| markup_for(span, text))
        .collect();
    // Outer spans first: earlier start, then longer extent.
    markups.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut cuts: Vec<usize> = vec![0, text.len()];
    for m in &markups {
        cuts.push(m.start);
        cuts.push(m.end);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut html = String::with_capacity(text.len());
    let mut stack: Vec<&Markup> = Vec::new();

    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<&Markup> = markups
            .iter()
            .filter(|m| m.start <= from && m.end >= to)
            .collect();

        let common = stack
            .iter()
            .zip(active.iter())
            .take_while(|(a, b)| std::ptr::eq(**a, **b))
            .count();
        while stack.len() > common {
            if let Some(m) = stack.pop() {
                html.push_str(m.close);
            }
        }
        for m in &active[common..] {
            html.push_str(&m.open);
            stack.push(*m);
        }

        html.push_str(&html_escape(&text[from..to]).replace('\n', "<br />"));
    }

    while let Some(m) = stack.pop() {
        html.push_str(m.close);
    }

    html
}
