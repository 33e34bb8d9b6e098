//! Content client - fetches documents from the headless content API

#[cfg(test)]
pub(crate) mod memory;
mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use prismic::PrismicClient;

/// Result type for content API operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Content API errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("content API returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("no {content_type} document with uid {uid:?}")]
    NotFound { content_type: String, uid: String },
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("content API did not report a master ref")]
    MissingMasterRef,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("background generation of {uid:?} failed: {message}")]
    Generation { uid: String, message: String },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

/// A document as returned by the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// Opaque cursor for the following page
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<RawRecord>,
}

/// Read-only access to the content repository
///
/// Implementations are shared across flows, so they must be `Send + Sync`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the first page of documents of a type
    async fn fetch_page(&self, content_type: &str, page_size: usize) -> ContentResult<ApiPage>;

    /// Fetch the page a cursor points at
    async fn fetch_next(&self, cursor: &str) -> ContentResult<ApiPage>;

    /// Fetch one document by uid
    async fn fetch_by_uid(&self, content_type: &str, uid: &str) -> ContentResult<RawRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_page() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "results_size": 1,
            "total_results_size": 3,
            "total_pages": 3,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{
                "id": "YbXy",
                "uid": "como-utilizar-hooks",
                "type": "publication",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": "2021-03-15T19:25:28+0000",
                "data": { "title": "Como utilizar Hooks" }
            }]
        }"#;

        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 3);
        assert!(page.next_page.is_some());
        assert_eq!(page.prev_page, None);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].content_type, "publication");
        assert_eq!(page.results[0].uid.as_deref(), Some("como-utilizar-hooks"));
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let record: RawRecord = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(record.uid, None);
        assert_eq!(record.first_publication_date, None);
        assert!(record.data.is_null());
    }

    #[test]
    fn test_not_found_predicate() {
        let err = ContentError::NotFound {
            content_type: "blogpost".to_string(),
            uid: "missing".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!ContentError::InvalidPageSize.is_not_found());
    }
}
