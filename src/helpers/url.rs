//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Path of a post page
///
/// # Examples
/// ```ignore
/// post_path("como utilizar") // -> "/post/como%20utilizar"
/// ```
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", path_segment(uid))
}

/// Percent-encode a value so it forms exactly one path segment
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Path of the listing expanded to `pages` pages
pub fn listing_path(pages: usize) -> String {
    if pages <= 1 {
        "/".to_string()
    } else {
        format!("/?pages={}", pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("como-utilizar-hooks"), "/post/como-utilizar-hooks");
        assert_eq!(post_path("a b/c"), "/post/a%20b%2Fc");
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("a/b"), "a%2Fb");
        assert_ne!(path_segment("a/b"), path_segment("a-b"));
    }

    #[test]
    fn test_listing_path() {
        assert_eq!(listing_path(0), "/");
        assert_eq!(listing_path(1), "/");
        assert_eq!(listing_path(3), "/?pages=3");
    }
}
