// Paginated list loading.
// Tracks the page cursor and the accumulated records for one paged endpoint.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;

/// Network collaborator returning the decoded records of one page.
pub trait PageFetcher<T>: Send + Sync {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Vec<T>>> + Send;
}

/// 1-based page number. Only moves forward, except on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor(u32);

impl Default for PageCursor {
    fn default() -> Self {
        Self(1)
    }
}

impl PageCursor {
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increase(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 1;
    }
}

/// Whether a page replaces the list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Fresh load: the page becomes the whole list.
    Replace,
    /// Load more: the page is appended.
    Append,
}

/// A page fetch that has been started but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub mode: LoadMode,
}

/// Page cursor plus accumulated records for one paged collection.
///
/// The loader does not guard against overlapping loads. Callers either use the
/// `&mut self` async methods, or drive [`begin_first`](Self::begin_first) /
/// [`begin_next`](Self::begin_next) and [`apply`](Self::apply) themselves and
/// keep at most one request outstanding.
///
/// `begin_next` advances the cursor before the fetch runs, so a failed load
/// more still moves the cursor and the next attempt asks for the page after.
#[derive(Debug)]
pub struct PagedListLoader<T, F> {
    fetcher: Arc<F>,
    cursor: PageCursor,
    items: Vec<T>,
}

impl<T, F: PageFetcher<T>> PagedListLoader<T, F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            cursor: PageCursor::default(),
            items: Vec::new(),
        }
    }

    /// Shared handle to the fetcher, for running a request on another task.
    pub fn fetcher(&self) -> Arc<F> {
        Arc::clone(&self.fetcher)
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Move the cursor back to page 1. Items stay until the next fresh load.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Request for the current page, replacing the list when applied.
    pub fn begin_first(&self) -> PageRequest {
        PageRequest {
            page: self.cursor.get(),
            mode: LoadMode::Replace,
        }
    }

    /// Advance the cursor and request that page, appending when applied.
    pub fn begin_next(&mut self) -> PageRequest {
        self.cursor.increase();
        PageRequest {
            page: self.cursor.get(),
            mode: LoadMode::Append,
        }
    }

    /// Commit the outcome of `request`. On error the list is left untouched.
    pub fn apply(&mut self, request: PageRequest, page: Result<Vec<T>>) -> Result<&[T]> {
        let mut records = page?;
        debug!(
            page = request.page,
            mode = ?request.mode,
            count = records.len(),
            "page loaded"
        );
        if request.mode == LoadMode::Replace {
            self.items.clear();
        }
        self.items.append(&mut records);
        Ok(&self.items)
    }

    /// Fetch the page at the cursor and replace the list with it.
    pub async fn load_first(&mut self) -> Result<&[T]> {
        let request = self.begin_first();
        let page = self.fetcher.fetch_page(request.page).await;
        self.apply(request, page)
    }

    /// Advance the cursor, fetch that page, and append it.
    pub async fn load_next(&mut self) -> Result<&[T]> {
        let request = self.begin_next();
        let page = self.fetcher.fetch_page(request.page).await;
        self.apply(request, page)
    }
}
