// State management module.
// Pagination, list selection, and per-screen view models.

pub mod detail;
pub mod gists;
pub mod list;
pub mod pager;

pub use detail::{DetailFocus, GistDetailState};
pub use gists::GistListState;
pub use list::{LoadingState, SelectableList};
pub use pager::{PageFetcher, PageRequest};

use crate::error::Result;

/// Rows from the end of a list at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// Paging operations a screen exposes to the event loop.
///
/// `refresh` and `load_more` only describe the fetch to run; the caller runs
/// it and hands the outcome back through `complete`.
pub trait PagedViewModel {
    type Item;
    type Fetcher: PageFetcher<Self::Item>;

    fn list(&self) -> &SelectableList<Self::Item, Self::Fetcher>;
    fn list_mut(&mut self) -> &mut SelectableList<Self::Item, Self::Fetcher>;

    fn items(&self) -> &[Self::Item] {
        self.list().items()
    }

    fn is_loading(&self) -> bool {
        self.list().status.is_loading()
    }

    /// Reset to page 1 and request it. `None` while a load is pending.
    fn refresh(&mut self) -> Option<PageRequest> {
        self.list_mut().refresh()
    }

    /// Request the next page. `None` while a load is pending or the list is exhausted.
    fn load_more(&mut self) -> Option<PageRequest> {
        self.list_mut().load_more()
    }

    /// Apply a finished request. Returns false if it was stale.
    fn complete(&mut self, request: PageRequest, result: Result<Vec<Self::Item>>) -> bool {
        self.list_mut().complete(request, result)
    }
}
