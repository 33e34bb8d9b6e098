//! Listing flow - the first page of posts plus "load more" pagination
//!
//! A [`Listing`] belongs to a single page view. It starts in
//! [`ListingState::Initial`] with the first page and moves to
//! [`ListingState::Expanded`] once another page has been appended. Pages are
//! appended in fetch order; nothing is re-sorted or de-duplicated.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::client::{ApiPage, ContentError, ContentSource};
use crate::config::SiteConfig;
use crate::content::{format_page, Post};
use crate::helpers::DateFormatter;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Most pages a single listing view expands to
pub const MAX_PAGES: usize = 10;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Fetch(#[from] ContentError),
    #[error("load-more ticket {0} does not match the pending request")]
    StaleTicket(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    /// Only the first page is shown
    Initial,
    /// At least one more page was appended
    Expanded,
}

/// What to list and how many per page
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub content_type: String,
    pub per_page: usize,
}

impl ListingOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            content_type: config.listing_type.clone(),
            per_page: config.per_page,
        }
    }
}

/// Permission to append the page behind one cursor
///
/// Only one ticket per listing is outstanding at a time, so repeated
/// "load more" triggers cannot append the same page twice.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadMoreTicket {
    id: u64,
    cursor: String,
}

impl LoadMoreTicket {
    /// The cursor to fetch
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// Ordered posts of one page view
#[derive(Debug, Clone)]
pub struct Listing {
    posts: Vec<Post>,
    next_page: Option<String>,
    state: ListingState,
    pending: Option<u64>,
    pages: usize,
}

impl Listing {
    /// Start a listing from its first page
    pub fn from_page(page: &ApiPage, dates: &DateFormatter) -> Self {
        Self {
            posts: format_page(&page.results, dates),
            next_page: page.next_page.clone(),
            state: ListingState::Initial,
            pending: None,
            pages: 1,
        }
    }

    /// Fetch the first page
    pub async fn load(
        source: &dyn ContentSource,
        options: &ListingOptions,
        dates: &DateFormatter,
    ) -> Result<Self, ListingError> {
        let page = source
            .fetch_page(&options.content_type, options.per_page)
            .await?;
        let listing = Self::from_page(&page, dates);
        tracing::debug!(
            "Loaded listing with {} posts (more: {})",
            listing.posts.len(),
            listing.next_page.is_some()
        );
        Ok(listing)
    }

    /// Fetch the first page and follow the cursor until `pages` pages are shown
    /// or the cursor runs out
    pub async fn load_pages(
        source: &dyn ContentSource,
        options: &ListingOptions,
        dates: &DateFormatter,
        pages: usize,
    ) -> Result<Self, ListingError> {
        let pages = pages.min(MAX_PAGES);
        let mut listing = Self::load(source, options, dates).await?;
        while listing.pages < pages && listing.can_load_more() {
            listing.load_more(source, dates).await?;
        }
        Ok(listing)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Cursor of the next page, if any
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn state(&self) -> ListingState {
        self.state
    }

    /// Number of pages shown so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the "load more" control should be offered
    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some() && self.pending.is_none()
    }

    /// Reserve the next page; `None` if there is none or a load is in flight
    pub fn begin_load_more(&mut self) -> Option<LoadMoreTicket> {
        if !self.can_load_more() {
            return None;
        }
        let cursor = self.next_page.clone()?;
        let id = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(id);
        Some(LoadMoreTicket { id, cursor })
    }

    /// Append the page fetched for `ticket` and advance the cursor
    ///
    /// Returns the number of appended posts.
    pub fn complete_load_more(
        &mut self,
        ticket: LoadMoreTicket,
        page: ApiPage,
        dates: &DateFormatter,
    ) -> Result<usize, ListingError> {
        if self.pending != Some(ticket.id) {
            tracing::warn!("Discarding page for stale ticket {}", ticket.id);
            return Err(ListingError::StaleTicket(ticket.id));
        }

        let new_posts = format_page(&page.results, dates);
        let appended = new_posts.len();
        self.posts.extend(new_posts);
        self.next_page = page.next_page;
        self.state = ListingState::Expanded;
        self.pending = None;
        self.pages += 1;

        Ok(appended)
    }

    /// Release the reservation after a failed fetch
    pub fn abort_load_more(&mut self, ticket: LoadMoreTicket) {
        if self.pending == Some(ticket.id) {
            self.pending = None;
        }
    }

    /// Fetch and append the next page; `Ok(0)` when there is nothing to load
    pub async fn load_more(
        &mut self,
        source: &dyn ContentSource,
        dates: &DateFormatter,
    ) -> Result<usize, ListingError> {
        let Some(ticket) = self.begin_load_more() else {
            return Ok(0);
        };

        match source.fetch_next(ticket.cursor()).await {
            Ok(page) => self.complete_load_more(ticket, page, dates),
            Err(e) => {
                self.abort_load_more(ticket);
                Err(e.into())
            }
        }
    }
}
