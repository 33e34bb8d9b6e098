//! Post models

use serde::{Deserialize, Serialize};

use crate::helpers::post_path;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier used in the post URL
    pub uid: Option<String>,

    /// Formatted publication date
    pub first_publication_date: Option<String>,

    pub data: PostData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl Post {
    /// URL path of the post page, if the post can be linked to
    pub fn path(&self) -> Option<String> {
        self.uid.as_deref().map(post_path)
    }
}

/// A post with everything its own page needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: Option<String>,

    /// Formatted publication date
    pub first_publication_date: Option<String>,

    /// Formatted date of the last edit
    pub last_publication_date: Option<String>,

    pub data: DetailData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    /// Sections in source order
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
}

/// One heading with its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    /// Plain-text heading
    pub heading: String,
    /// Rendered HTML body
    pub body: String,
}

impl PostDetail {
    /// Whether the post was edited after it was first published
    pub fn was_edited(&self) -> bool {
        match (&self.first_publication_date, &self.last_publication_date) {
            (Some(first), Some(last)) => first != last,
            _ => false,
        }
    }
}
