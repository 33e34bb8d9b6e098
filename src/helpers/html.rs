//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
///
/// Removes every `<...>` run, inclusive. Text and whitespace between tags are
/// kept as-is, and a `<` with no closing `>` is left in place.
///
/// # Examples
/// ```ignore
/// strip_html("<p>Hello</p> <b>World</b>") // -> "Hello World"
/// ```
pub fn strip_html(s: &str) -> String {
    TAG.replace_all(s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello</p> <b>World</b>"), "Hello World");
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_html("<a href=\"/x\">link</a>"), "link");
        assert_eq!(strip_html("1 < 2"), "1 < 2");
        assert_eq!(strip_html("<>x"), "x");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
