// Selectable paged list state.
// Couples a PagedListLoader with selection, load status, and the re-trigger guard.

use ratatui::widgets::ListState;
use tracing::warn;

use crate::error::Result;

use super::pager::{LoadMode, PageFetcher, PageRequest, PagedListLoader};

/// Load status shown by the list's owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading(PageRequest),
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    /// True while the first page of a fresh load is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(
            self,
            LoadingState::Loading(PageRequest {
                mode: LoadMode::Replace,
                ..
            })
        )
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadingState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// State for a paged list with keyboard navigation.
///
/// At most one page request is outstanding: `refresh` and `load_more` return
/// `None` while one is pending, and `complete` ignores results that do not
/// match it.
#[derive(Debug)]
pub struct SelectableList<T, F> {
    loader: PagedListLoader<T, F>,
    pub list_state: ListState,
    pub status: LoadingState,
    exhausted: bool,
}

impl<T, F: PageFetcher<T>> SelectableList<T, F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            loader: PagedListLoader::new(fetcher),
            list_state: ListState::default(),
            status: LoadingState::Idle,
            exhausted: false,
        }
    }

    pub fn loader(&self) -> &PagedListLoader<T, F> {
        &self.loader
    }

    pub fn items(&self) -> &[T] {
        self.loader.items()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Whether the last page came back empty.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Start a fresh load from page 1.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        if self.status.is_loading() {
            return None;
        }
        self.loader.reset();
        self.exhausted = false;
        let request = self.loader.begin_first();
        self.status = LoadingState::Loading(request);
        Some(request)
    }

    /// Start loading the next page, unless a load is pending or the list is exhausted.
    ///
    /// An empty list has no first page to continue from, so this waits for `refresh`.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.status.is_loading() || self.exhausted || self.is_empty() {
            return None;
        }
        let request = self.loader.begin_next();
        self.status = LoadingState::Loading(request);
        Some(request)
    }

    /// Apply the outcome of `request`. Returns false if the result was stale and dropped.
    pub fn complete(&mut self, request: PageRequest, result: Result<Vec<T>>) -> bool {
        if self.status != LoadingState::Loading(request) {
            return false;
        }

        let empty_page = matches!(&result, Ok(records) if records.is_empty());
        match self.loader.apply(request, result) {
            Ok(_) => {
                self.status = LoadingState::Idle;
                self.exhausted = empty_page;
                if request.mode == LoadMode::Replace || self.list_state.selected().is_none() {
                    self.reset_selection();
                }
            }
            Err(e) => {
                warn!(page = request.page, kind = ?e.kind(), error = %e, "page load failed");
                self.status = LoadingState::Error(e.to_string());
            }
        }
        true
    }

    /// Get the currently selected index.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Get the selected item.
    pub fn selected_item(&self) -> Option<&T> {
        self.items().get(self.list_state.selected()?)
    }

    /// Select the next item in the list.
    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= len - 1 => i,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item in the list.
    pub fn select_prev(&mut self) {
        if self.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Check if we're near the end of the list (for pagination trigger).
    pub fn near_end(&self, threshold: usize) -> bool {
        match self.list_state.selected() {
            Some(index) => !self.exhausted && index >= self.len().saturating_sub(threshold),
            None => false,
        }
    }

    /// Reset selection to first item.
    pub fn reset_selection(&mut self) {
        if self.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }
}
