//! Detail flow - post pages, pre-rendered or generated on first request
//!
//! Generated pages are kept for the revalidation window. After that they are
//! still served while a regeneration runs in the background, so a served page
//! is never older than the window plus one regeneration.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::client::{ContentError, ContentResult, ContentSource};
use crate::config::{Fallback, SiteConfig};
use crate::content::{format_detail, PostDetail};
use crate::helpers::DateFormatter;

/// What a post page currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// Generation has not finished yet
    Loading { uid: String },
    /// The post is rendered
    Ready(PostDetail),
    /// The content API has no such post
    NotFound,
}

/// Answer to a page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailResponse {
    /// Within the revalidation window
    Fresh(PostDetail),
    /// Past the window; a regeneration has been started
    Stale(PostDetail),
    /// Placeholder while the page is generated
    Loading,
    NotFound,
}

/// Upper bound on remembered missing or failed uids
const MAX_MISSES: usize = 1024;

#[derive(Debug, Clone)]
struct Generated {
    detail: PostDetail,
    generated_at: Instant,
}

/// A uid without a page
#[derive(Debug, Clone)]
enum Miss {
    /// The API has no document with this uid
    NotFound,
    /// Background generation failed; reported to the next request
    Failed(String),
}

#[derive(Debug, Clone)]
struct MissEntry {
    miss: Miss,
    recorded_at: Instant,
}

/// Post pages for one site
pub struct DetailFlow {
    source: Arc<dyn ContentSource>,
    post_type: String,
    dates: DateFormatter,
    fallback: Fallback,
    revalidate: Duration,
    pages: RwLock<HashMap<String, Generated>>,
    misses: Mutex<HashMap<String, MissEntry>>,
    in_progress: Mutex<HashSet<String>>,
}

impl DetailFlow {
    pub fn new(
        source: Arc<dyn ContentSource>,
        post_type: &str,
        dates: DateFormatter,
        fallback: Fallback,
        revalidate: Duration,
    ) -> Self {
        Self {
            source,
            post_type: post_type.to_string(),
            dates,
            fallback,
            revalidate,
            pages: RwLock::new(HashMap::new()),
            misses: Mutex::new(HashMap::new()),
            in_progress: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(
        source: Arc<dyn ContentSource>,
        config: &SiteConfig,
        dates: DateFormatter,
    ) -> Self {
        Self::new(
            source,
            &config.post_type,
            dates,
            config.fallback,
            config.revalidate_after(),
        )
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Generate the fixed set of pages known at build time
    pub async fn prerender(&self, uids: &[String]) -> ContentResult<Vec<PostDetail>> {
        let mut details = Vec::with_capacity(uids.len());
        for uid in uids {
            details.push(self.generate(uid).await?);
        }
        tracing::info!("Pre-rendered {} post pages", details.len());
        Ok(details)
    }

    /// Current state of a page, without triggering generation
    pub async fn state(&self, uid: &str) -> DetailState {
        if let Some(generated) = self.pages.read().await.get(uid) {
            return DetailState::Ready(generated.detail.clone());
        }
        match self.misses().get(uid) {
            Some(MissEntry {
                miss: Miss::NotFound,
                ..
            }) => DetailState::NotFound,
            _ => DetailState::Loading {
                uid: uid.to_string(),
            },
        }
    }

    /// Fetch, format and store one page
    ///
    /// A missing uid is remembered for the revalidation window so later
    /// requests answer not found without waiting on the API.
    pub async fn generate(&self, uid: &str) -> ContentResult<PostDetail> {
        match self.source.fetch_by_uid(&self.post_type, uid).await {
            Ok(raw) => {
                let detail = format_detail(&raw, &self.dates);
                self.misses().remove(uid);
                self.pages.write().await.insert(
                    uid.to_string(),
                    Generated {
                        detail: detail.clone(),
                        generated_at: Instant::now(),
                    },
                );
                tracing::debug!("Generated post page {}", uid);
                Ok(detail)
            }
            Err(e) if e.is_not_found() => {
                self.pages.write().await.remove(uid);
                self.record_miss(uid, Miss::NotFound);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Answer a page request according to the fallback policy
    pub async fn request(self: &Arc<Self>, uid: &str) -> ContentResult<DetailResponse> {
        let stored = self.pages.read().await.get(uid).cloned();

        if let Some(generated) = stored {
            if generated.generated_at.elapsed() > self.revalidate {
                self.spawn_generation(uid);
                return Ok(DetailResponse::Stale(generated.detail));
            }
            return Ok(DetailResponse::Fresh(generated.detail));
        }

        if let Some(response) = self.recorded_miss(uid)? {
            return Ok(response);
        }

        match self.fallback {
            Fallback::Disabled => Ok(DetailResponse::NotFound),
            Fallback::Placeholder => {
                self.spawn_generation(uid);
                Ok(DetailResponse::Loading)
            }
            Fallback::Blocking => match self.generate(uid).await {
                Ok(detail) => Ok(DetailResponse::Fresh(detail)),
                Err(ContentError::NotFound { .. }) => Ok(DetailResponse::NotFound),
                Err(e) => Err(e),
            },
        }
    }

    fn misses(&self) -> MutexGuard<'_, HashMap<String, MissEntry>> {
        self.misses.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remember a miss, evicting expired entries and then the oldest when full
    fn record_miss(&self, uid: &str, miss: Miss) {
        let mut misses = self.misses();
        if misses.len() >= MAX_MISSES && !misses.contains_key(uid) {
            let window = self.revalidate;
            misses.retain(|_, entry| entry.recorded_at.elapsed() <= window);
            if misses.len() >= MAX_MISSES {
                let oldest = misses
                    .iter()
                    .min_by_key(|(_, entry)| entry.recorded_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    misses.remove(&oldest);
                }
            }
        }
        misses.insert(
            uid.to_string(),
            MissEntry {
                miss,
                recorded_at: Instant::now(),
            },
        );
    }

    /// Answer from a remembered miss
    ///
    /// A failure is reported once, so the following request tries again. An
    /// expired not-found entry is dropped and the uid is looked up afresh.
    fn recorded_miss(&self, uid: &str) -> ContentResult<Option<DetailResponse>> {
        let mut misses = self.misses();
        let (miss, fresh) = match misses.get(uid) {
            Some(entry) => (
                entry.miss.clone(),
                entry.recorded_at.elapsed() <= self.revalidate,
            ),
            None => return Ok(None),
        };

        match miss {
            Miss::NotFound if fresh => Ok(Some(DetailResponse::NotFound)),
            Miss::NotFound => {
                misses.remove(uid);
                Ok(None)
            }
            Miss::Failed(message) => {
                misses.remove(uid);
                Err(ContentError::Generation {
                    uid: uid.to_string(),
                    message,
                })
            }
        }
    }

    /// Generate a page in the background, at most once at a time per uid
    fn spawn_generation(self: &Arc<Self>, uid: &str) {
        let started = self
            .in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid.to_string());
        if !started {
            return;
        }

        let flow = Arc::clone(self);
        let uid = uid.to_string();
        tokio::spawn(async move {
            match flow.generate(&uid).await {
                Ok(_) => {}
                Err(ContentError::NotFound { .. }) => {
                    tracing::info!("Post {} not found", uid)
                }
                Err(e) => {
                    tracing::error!("Failed to generate post {}: {}", uid, e);
                    // Stale pages keep being served; only a waiting reader hears of it.
                    if !flow.pages.read().await.contains_key(&uid) {
                        flow.record_miss(&uid, Miss::Failed(e.to_string()));
                    }
                }
            }
            flow.in_progress
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&uid);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{blogpost, MemorySource};

    fn source() -> Arc<MemorySource> {
        Arc::new(MemorySource::with_records(
            "blogpost",
            vec![blogpost("hooks", "Hooks"), blogpost("rust", "Rust")],
        ))
    }

    fn flow(source: Arc<MemorySource>, fallback: Fallback, revalidate: Duration) -> Arc<DetailFlow> {
        Arc::new(DetailFlow::new(
            source,
            "blogpost",
            DateFormatter::default(),
            fallback,
            revalidate,
        ))
    }

    async fn wait_until_settled(flow: &DetailFlow, uid: &str) -> DetailState {
        for _ in 0..200 {
            let state = flow.state(uid).await;
            if !matches!(state, DetailState::Loading { .. }) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        flow.state(uid).await
    }

    #[tokio::test]
    async fn test_placeholder_answers_loading_before_ready() {
        let flow = flow(source(), Fallback::Placeholder, Duration::from_secs(1800));

        assert_eq!(
            flow.state("hooks").await,
            DetailState::Loading {
                uid: "hooks".to_string()
            }
        );
        assert_eq!(flow.request("hooks").await.unwrap(), DetailResponse::Loading);

        match wait_until_settled(&flow, "hooks").await {
            DetailState::Ready(detail) => assert_eq!(detail.data.title, "Hooks"),
            other => panic!("expected ready, got {:?}", other),
        }
        assert!(matches!(
            flow.request("hooks").await.unwrap(),
            DetailResponse::Fresh(_)
        ));
    }

    #[tokio::test]
    async fn test_blocking_generates_during_request() {
        let flow = flow(source(), Fallback::Blocking, Duration::from_secs(1800));
        match flow.request("rust").await.unwrap() {
            DetailResponse::Fresh(detail) => assert_eq!(detail.uid.as_deref(), Some("rust")),
            other => panic!("expected fresh page, got {:?}", other),
        }
        assert!(matches!(flow.state("rust").await, DetailState::Ready(_)));
    }

    #[tokio::test]
    async fn test_prerendered_pages_skip_fetch() {
        let source = source();
        let flow = flow(source.clone(), Fallback::Disabled, Duration::from_secs(1800));
        flow.prerender(&["hooks".to_string()]).await.unwrap();
        let fetches = source.fetch_count();

        assert!(matches!(
            flow.request("hooks").await.unwrap(),
            DetailResponse::Fresh(_)
        ));
        assert_eq!(flow.request("rust").await.unwrap(), DetailResponse::NotFound);
        assert_eq!(source.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let flow = flow(source(), Fallback::Blocking, Duration::from_secs(1800));
        assert_eq!(flow.request("missing").await.unwrap(), DetailResponse::NotFound);
        assert_eq!(flow.state("missing").await, DetailState::NotFound);

        let placeholder = self::flow(source(), Fallback::Placeholder, Duration::from_secs(1800));
        assert_eq!(placeholder.request("missing").await.unwrap(), DetailResponse::Loading);
        assert_eq!(wait_until_settled(&placeholder, "missing").await, DetailState::NotFound);
        assert_eq!(placeholder.request("missing").await.unwrap(), DetailResponse::NotFound);
    }

    #[tokio::test]
    async fn test_stale_page_is_served_then_regenerated() {
        let source = source();
        let flow = flow(source.clone(), Fallback::Blocking, Duration::ZERO);
        flow.generate("hooks").await.unwrap();
        let fetches = source.fetch_count();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(matches!(
            flow.request("hooks").await.unwrap(),
            DetailResponse::Stale(_)
        ));

        for _ in 0..200 {
            if source.fetch_count() > fetches {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(source.fetch_count() > fetches);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_in_blocking_mode() {
        let source = source();
        source.set_failing(true);
        let flow = flow(source, Fallback::Blocking, Duration::from_secs(1800));
        assert!(flow.request("hooks").await.is_err());
        assert!(matches!(
            flow.state("hooks").await,
            DetailState::Loading { .. }
        ));
    }

    #[tokio::test]
    async fn test_placeholder_failure_reaches_next_request() {
        let source = source();
        source.set_failing(true);
        let flow = flow(source.clone(), Fallback::Placeholder, Duration::from_secs(1800));

        assert_eq!(flow.request("hooks").await.unwrap(), DetailResponse::Loading);
        for _ in 0..200 {
            let idle = flow.in_progress.lock().unwrap().is_empty();
            if source.fetch_count() > 0 && idle {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(matches!(
            flow.request("hooks").await,
            Err(ContentError::Generation { .. })
        ));
        assert_eq!(source.fetch_count(), 1);

        // Reported once; the next request starts over
        source.set_failing(false);
        assert_eq!(flow.request("hooks").await.unwrap(), DetailResponse::Loading);
        assert!(matches!(
            wait_until_settled(&flow, "hooks").await,
            DetailState::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_uids_are_bounded() {
        let flow = flow(source(), Fallback::Blocking, Duration::from_secs(1800));
        for i in 0..(MAX_MISSES * 3) {
            let uid = format!("missing-{}", i);
            assert_eq!(flow.request(&uid).await.unwrap(), DetailResponse::NotFound);
        }

        assert!(flow.pages.read().await.is_empty());
        assert_eq!(flow.misses().len(), MAX_MISSES);
        let last = format!("missing-{}", MAX_MISSES * 3 - 1);
        assert_eq!(flow.state(&last).await, DetailState::NotFound);
    }

    #[tokio::test]
    async fn test_expired_not_found_is_looked_up_again() {
        let source = source();
        let flow = flow(source.clone(), Fallback::Blocking, Duration::ZERO);
        assert_eq!(flow.request("later").await.unwrap(), DetailResponse::NotFound);

        source.insert("blogpost", vec![blogpost("later", "Later")]);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(matches!(
            flow.request("later").await.unwrap(),
            DetailResponse::Fresh(_)
        ));
    }
}
