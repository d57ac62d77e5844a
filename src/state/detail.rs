// Gist detail screen state.
// Shows a gist's files and pages through its commit history.

use ratatui::widgets::ListState;

use crate::github::{Commit, Gist, GistCommits, GistFile};

use super::list::SelectableList;
use super::pager::PageFetcher;
use super::{LOAD_MORE_THRESHOLD, PagedViewModel};

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailFocus {
    #[default]
    Files,
    Commits,
}

/// Complete state for the detail screen of one gist.
#[derive(Debug)]
pub struct GistDetailState<F = GistCommits> {
    pub gist: Gist,
    /// Files shown for the gist, capped at the configured maximum.
    pub files: Vec<GistFile>,
    pub file_state: ListState,
    pub commits: SelectableList<Commit, F>,
    pub focus: DetailFocus,
}

impl<F: PageFetcher<Commit>> GistDetailState<F> {
    pub fn new(gist: Gist, max_files: usize, fetcher: F) -> Self {
        let files: Vec<GistFile> = gist.files.values().take(max_files).cloned().collect();
        let mut file_state = ListState::default();
        if !files.is_empty() {
            file_state.select(Some(0));
        }
        Self {
            gist,
            files,
            file_state,
            commits: SelectableList::new(fetcher),
            focus: DetailFocus::default(),
        }
    }

    pub fn gist_id(&self) -> &str {
        &self.gist.id
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            DetailFocus::Files => DetailFocus::Commits,
            DetailFocus::Commits => DetailFocus::Files,
        };
    }

    pub fn selected_file(&self) -> Option<&GistFile> {
        self.files.get(self.file_state.selected()?)
    }

    pub fn select_next(&mut self) {
        match self.focus {
            DetailFocus::Files => {
                if let Some(i) = self.file_state.selected() {
                    self.file_state
                        .select(Some((i + 1).min(self.files.len().saturating_sub(1))));
                }
            }
            DetailFocus::Commits => self.commits.select_next(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            DetailFocus::Files => {
                if let Some(i) = self.file_state.selected() {
                    self.file_state.select(Some(i.saturating_sub(1)));
                }
            }
            DetailFocus::Commits => self.commits.select_prev(),
        }
    }

    /// Whether the commit selection is close enough to the end to fetch more.
    pub fn wants_more(&self) -> bool {
        self.focus == DetailFocus::Commits && self.commits.near_end(LOAD_MORE_THRESHOLD)
    }
}

impl<F: PageFetcher<Commit>> PagedViewModel for GistDetailState<F> {
    type Item = Commit;
    type Fetcher = F;

    fn list(&self) -> &SelectableList<Commit, F> {
        &self.commits
    }

    fn list_mut(&mut self) -> &mut SelectableList<Commit, F> {
        &mut self.commits
    }
}
