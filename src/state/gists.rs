// Gist list screen state.

use std::collections::HashSet;

use crate::github::{Gist, PublicGists};

use super::list::SelectableList;
use super::pager::PageFetcher;
use super::{LOAD_MORE_THRESHOLD, PagedViewModel};

/// Public gists, loaded page by page.
#[derive(Debug)]
pub struct GistListState<F = PublicGists> {
    pub gists: SelectableList<Gist, F>,
}

impl<F: PageFetcher<Gist>> GistListState<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            gists: SelectableList::new(fetcher),
        }
    }

    pub fn selected_gist(&self) -> Option<&Gist> {
        self.gists.selected_item()
    }

    /// Whether the selection is close enough to the end to fetch more.
    pub fn wants_more(&self) -> bool {
        self.gists.near_end(LOAD_MORE_THRESHOLD)
    }

    /// Distinct avatar URLs of the loaded gists, in list order.
    pub fn avatar_urls(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.gists
            .items()
            .iter()
            .filter_map(Gist::avatar_url)
            .filter(|url| seen.insert(*url))
            .collect()
    }
}

impl<F: PageFetcher<Gist>> PagedViewModel for GistListState<F> {
    type Item = Gist;
    type Fetcher = F;

    fn list(&self) -> &SelectableList<Gist, F> {
        &self.gists
    }

    fn list_mut(&mut self) -> &mut SelectableList<Gist, F> {
        &mut self.gists
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Result;

    pub(crate) struct NoGists;

    impl PageFetcher<Gist> for NoGists {
        async fn fetch_page(&self, _page: u32) -> Result<Vec<Gist>> {
            Ok(Vec::new())
        }
    }

    pub(crate) fn gist(id: &str, owner: Option<&str>, files: &[&str]) -> Gist {
        let files: serde_json::Map<String, serde_json::Value> = files
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    serde_json::json!({
                        "filename": name,
                        "type": "text/plain",
                        "language": null,
                        "raw_url": format!("https://gist.githubusercontent.com/raw/{}/{}", id, name),
                        "size": 10
                    }),
                )
            })
            .collect();
        let owner = owner.map(|login| {
            serde_json::json!({
                "id": 1,
                "login": login,
                "avatar_url": format!("https://avatars.githubusercontent.com/{}", login)
            })
        });
        serde_json::from_value(serde_json::json!({
            "id": id,
            "description": format!("gist {}", id),
            "html_url": format!("https://gist.github.com/{}", id),
            "owner": owner,
            "files": files,
            "created_at": "2024-09-27T10:00:00Z",
            "updated_at": "2024-09-27T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_refresh_then_load_more_through_trait() {
        let mut state = GistListState::new(NoGists);

        let first = state.refresh().unwrap();
        assert!(state.is_loading());
        state.complete(first, Ok(vec![gist("a", Some("octocat"), &[])]));

        let next = state.load_more().unwrap();
        state.complete(next, Ok(vec![gist("b", None, &[])]));

        let ids: Vec<_> = state.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.selected_gist().map(|g| g.id.as_str()), Some("a"));
    }

    #[test]
    fn test_avatar_urls_are_deduplicated() {
        let mut state = GistListState::new(NoGists);
        let first = state.refresh().unwrap();
        state.complete(
            first,
            Ok(vec![
                gist("a", Some("octocat"), &[]),
                gist("b", None, &[]),
                gist("c", Some("octocat"), &[]),
                gist("d", Some("hubot"), &[]),
            ]),
        );

        assert_eq!(
            state.avatar_urls(),
            vec![
                "https://avatars.githubusercontent.com/octocat",
                "https://avatars.githubusercontent.com/hubot",
            ]
        );
    }

    #[test]
    fn test_wants_more_near_end() {
        let mut state = GistListState::new(NoGists);
        let first = state.refresh().unwrap();
        state.complete(first, Ok(vec![gist("a", None, &[]), gist("b", None, &[])]));

        // With fewer rows than the threshold the first row is already near the end.
        assert!(state.wants_more());
    }
}
