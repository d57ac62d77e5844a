// GitHub API endpoint functions.
// Typed gist endpoints plus the fetcher adapters used by the loaders and image cache.

use std::sync::Arc;

use crate::cache::ResourceFetcher;
use crate::error::Result;
use crate::state::PageFetcher;

use super::client::GitHubClient;
use super::types::{Commit, Gist};

impl GitHubClient {
    /// List public gists, newest first.
    pub async fn list_public_gists(&self, page: u32, per_page: u32) -> Result<Vec<Gist>> {
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self.get_with_params("/gists/public", &params).await?;
        let gists: Vec<Gist> = response.json().await?;
        Ok(gists)
    }

    /// List the revision history of a gist.
    pub async fn list_gist_commits(
        &self,
        gist_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Commit>> {
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self
            .get_with_params(&format!("/gists/{}/commits", gist_id), &params)
            .await?;
        let commits: Vec<Commit> = response.json().await?;
        Ok(commits)
    }

    /// Download raw bytes from an absolute URL.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_absolute(url).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl ResourceFetcher for GitHubClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.download(url).await
    }
}

/// Pages of `/gists/public`.
#[derive(Clone)]
pub struct PublicGists {
    client: Arc<GitHubClient>,
    per_page: u32,
}

impl PublicGists {
    pub fn new(client: Arc<GitHubClient>, per_page: u32) -> Self {
        Self { client, per_page }
    }
}

impl PageFetcher<Gist> for PublicGists {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Gist>> {
        self.client.list_public_gists(page, self.per_page).await
    }
}

/// Pages of `/gists/{id}/commits` for one gist.
#[derive(Clone)]
pub struct GistCommits {
    client: Arc<GitHubClient>,
    gist_id: String,
    per_page: u32,
}

impl GistCommits {
    pub fn new(client: Arc<GitHubClient>, gist_id: impl Into<String>, per_page: u32) -> Self {
        Self {
            client,
            gist_id: gist_id.into(),
            per_page,
        }
    }
}

impl PageFetcher<Commit> for GistCommits {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Commit>> {
        self.client
            .list_gist_commits(&self.gist_id, page, self.per_page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, GistError};
    use crate::state::pager::PagedListLoader;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gist_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "description": format!("gist {}", id),
            "html_url": format!("https://gist.github.com/{}", id),
            "owner": {
                "id": 7,
                "login": "octocat",
                "avatar_url": "https://avatars.githubusercontent.com/u/7?v=4"
            },
            "files": {},
            "created_at": "2024-09-27T10:00:00Z",
            "updated_at": "2024-09-27T10:00:00Z"
        })
    }

    async fn mount_gist_page(server: &MockServer, page: &str, ids: &[&str]) {
        let body: Vec<_> = ids.iter().map(|id| gist_json(id)).collect();
        Mock::given(method("GET"))
            .and(path("/gists/public"))
            .and(query_param("page", page))
            .and(query_param("per_page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_public_gists_pages_through_loader() {
        let mock_server = MockServer::start().await;
        mount_gist_page(&mock_server, "1", &["a", "b"]).await;
        mount_gist_page(&mock_server, "2", &["c", "d"]).await;
        mount_gist_page(&mock_server, "3", &[]).await;

        let client = Arc::new(GitHubClient::new(&mock_server.uri()).unwrap());
        let mut loader = PagedListLoader::new(PublicGists::new(client, 2));

        loader.load_first().await.unwrap();
        loader.load_next().await.unwrap();
        let items = loader.load_next().await.unwrap();

        let ids: Vec<_> = items.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(loader.cursor().get(), 3);
    }

    #[tokio::test]
    async fn test_gist_commits_endpoint() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/abc/commits"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "url": "https://api.github.com/gists/abc/57a7f021",
                "version": "57a7f021a713b1c5a6a199b54cc514735d2d462f",
                "user": null,
                "change_status": { "deletions": 1, "additions": 2, "total": 3 },
                "committed_at": "2024-09-27T10:00:00Z"
            }])))
            .mount(&mock_server)
            .await;

        let client = Arc::new(GitHubClient::new(&mock_server.uri()).unwrap());
        let commits = GistCommits::new(client, "abc", 30).fetch_page(1).await.unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].change_status.total, 3);
    }

    #[tokio::test]
    async fn test_malformed_page_is_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/public"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
            .mount(&mock_server)
            .await;

        let client = Arc::new(GitHubClient::new(&mock_server.uri()).unwrap());
        let err = PublicGists::new(client, 30).fetch_page(1).await.unwrap_err();

        assert!(matches!(err, GistError::Api(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_download_returns_raw_bytes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/u/7"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri()).unwrap();
        let bytes = client
            .fetch_bytes(&format!("{}/u/7", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
