//! Incremental post listing driven by an opaque next-page cursor

use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

use crate::api::{ContentSource, FetchError};
use crate::content::{Cursor, PageResult, PostSummary};

/// What a call to [`Paginator::load_more`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many posts were appended
    Appended(usize),
    /// There is no next page; nothing happened
    Exhausted,
    /// Another load is still in flight; this call was ignored
    Busy,
}

#[derive(Debug)]
struct Listing {
    items: Vec<PostSummary>,
    cursor: Option<Cursor>,
}

/// Posts loaded so far plus the cursor of the next page.
///
/// Items keep the order the source returned them in, page after page, without
/// de-duplication. At most one `load_more` runs at a time; overlapping calls
/// return [`LoadOutcome::Busy`].
pub struct Paginator {
    source: Arc<dyn ContentSource>,
    listing: RwLock<Listing>,
    in_flight: Mutex<()>,
}

impl Paginator {
    /// Start from the first page of the listing
    pub fn new(source: Arc<dyn ContentSource>, first_page: PageResult) -> Self {
        Self {
            source,
            listing: RwLock::new(Listing {
                items: first_page.items,
                cursor: first_page.next_cursor,
            }),
            in_flight: Mutex::new(()),
        }
    }

    /// Fetch the first page from `source` and start from it
    pub async fn start(source: Arc<dyn ContentSource>) -> Result<Self, FetchError> {
        let first_page = source.fetch_initial_page().await?;
        Ok(Self::new(source, first_page))
    }

    /// Snapshot of the posts loaded so far
    pub fn items(&self) -> Vec<PostSummary> {
        self.listing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    pub fn len(&self) -> usize {
        self.listing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor of the next page, if any
    pub fn cursor(&self) -> Option<Cursor> {
        self.listing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cursor
            .clone()
    }

    pub fn has_more(&self) -> bool {
        self.cursor().is_some()
    }

    /// Fetch the next page and append it.
    ///
    /// On failure nothing changes, so the same cursor can be retried.
    pub async fn load_more(&self) -> Result<LoadOutcome, FetchError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Load already in flight, ignoring");
            return Ok(LoadOutcome::Busy);
        };

        let Some(cursor) = self.cursor() else {
            return Ok(LoadOutcome::Exhausted);
        };

        let page = self.source.fetch_page(&cursor).await.map_err(|e| {
            tracing::warn!("Failed to load page {}: {}", cursor, e);
            e
        })?;

        let appended = page.items.len();
        let mut listing = self
            .listing
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listing.items.extend(page.items);
        listing.cursor = page.next_cursor;
        tracing::debug!(
            "Loaded {} more posts ({} total, more: {})",
            appended,
            listing.items.len(),
            listing.cursor.is_some()
        );

        Ok(LoadOutcome::Appended(appended))
    }

    /// Keep loading until the listing is exhausted.
    ///
    /// Returns the size of every page appended, in order.
    pub async fn load_all(&self) -> Result<Vec<usize>, FetchError> {
        let mut page_sizes = Vec::new();
        loop {
            match self.load_more().await? {
                LoadOutcome::Appended(n) => page_sizes.push(n),
                LoadOutcome::Exhausted => return Ok(page_sizes),
                LoadOutcome::Busy => {
                    // Wait for the other load to settle, then continue
                    drop(self.in_flight.lock().await);
                }
            }
        }
    }
}
