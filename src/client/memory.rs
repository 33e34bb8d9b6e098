//! In-memory content source for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ApiPage, ContentError, ContentResult, ContentSource, RawRecord};

/// Serves records from memory, paginating with `memory://` cursors
#[derive(Default)]
pub(crate) struct MemorySource {
    records: Mutex<HashMap<String, Vec<RawRecord>>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(content_type: &str, records: Vec<RawRecord>) -> Self {
        let source = Self::new();
        source.insert(content_type, records);
        source
    }

    pub fn insert(&self, content_type: &str, records: Vec<RawRecord>) {
        self.records
            .lock()
            .unwrap()
            .entry(content_type.to_string())
            .or_default()
            .extend(records);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn begin_fetch(&self) -> ContentResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentError::Status {
                status: 503,
                url: "memory://".to_string(),
            });
        }
        Ok(())
    }

    fn page_at(&self, content_type: &str, offset: usize, page_size: usize) -> ApiPage {
        let records = self.records.lock().unwrap();
        let all = records.get(content_type).cloned().unwrap_or_default();
        let end = (offset + page_size).min(all.len());
        let results = all.get(offset..end).map(|r| r.to_vec()).unwrap_or_default();
        let next_page = if end < all.len() {
            Some(format!("memory://{}/{}/{}", content_type, end, page_size))
        } else {
            None
        };

        ApiPage {
            page: (offset / page_size) as u32 + 1,
            results_per_page: page_size as u32,
            total_results_size: all.len() as u32,
            total_pages: all.len().div_ceil(page_size) as u32,
            next_page,
            prev_page: None,
            results,
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn fetch_page(&self, content_type: &str, page_size: usize) -> ContentResult<ApiPage> {
        if page_size == 0 {
            return Err(ContentError::InvalidPageSize);
        }
        self.begin_fetch()?;
        Ok(self.page_at(content_type, 0, page_size))
    }

    async fn fetch_next(&self, cursor: &str) -> ContentResult<ApiPage> {
        self.begin_fetch()?;
        let invalid = || ContentError::InvalidUrl(cursor.to_string());
        let rest = cursor.strip_prefix("memory://").ok_or_else(invalid)?;
        let mut parts = rest.split('/');
        let content_type = parts.next().ok_or_else(invalid)?;
        let offset = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let page_size = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        Ok(self.page_at(content_type, offset, page_size))
    }

    async fn fetch_by_uid(&self, content_type: &str, uid: &str) -> ContentResult<RawRecord> {
        self.begin_fetch()?;
        self.records
            .lock()
            .unwrap()
            .get(content_type)
            .and_then(|records| records.iter().find(|r| r.uid.as_deref() == Some(uid)))
            .cloned()
            .ok_or_else(|| ContentError::NotFound {
                content_type: content_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

/// A listing record with a rich-text title
pub(crate) fn publication(uid: &str, title: &str) -> RawRecord {
    RawRecord {
        id: format!("id-{}", uid),
        uid: Some(uid.to_string()),
        content_type: "publication".to_string(),
        first_publication_date: Some("2023-04-19T13:05:00+0000".to_string()),
        last_publication_date: None,
        data: serde_json::json!({
            "title": [{ "type": "heading1", "text": title, "spans": [] }],
            "subtitle": [{ "type": "paragraph", "text": format!("About {}", title), "spans": [] }],
            "author": [{ "type": "paragraph", "text": "Joseph Oliveira", "spans": [] }],
        }),
    }
}

/// A post record with two content sections
pub(crate) fn blogpost(uid: &str, title: &str) -> RawRecord {
    RawRecord {
        id: format!("id-{}", uid),
        uid: Some(uid.to_string()),
        content_type: "blogpost".to_string(),
        first_publication_date: Some("2023-04-19T13:05:00+0000".to_string()),
        last_publication_date: Some("2023-04-20T09:00:00+0000".to_string()),
        data: serde_json::json!({
            "title": [{ "type": "heading1", "text": title, "spans": [] }],
            "author": [{ "type": "paragraph", "text": "Danilo Vieira", "spans": [] }],
            "banner": { "url": "https://images.prismic.io/blog/banner.png" },
            "content": [
                {
                    "heading": [{ "type": "heading2", "text": "Proin et varius", "spans": [] }],
                    "body": [{ "type": "paragraph", "text": "Lorem ipsum dolor", "spans": [] }]
                },
                {
                    "heading": [{ "type": "heading2", "text": "Cras laoreet", "spans": [] }],
                    "body": [{ "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] }]
                }
            ],
        }),
    }
}
