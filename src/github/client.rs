// GitHub API HTTP client.
// Handles default headers, rate limit tracking, and response status mapping.

use parking_lot::Mutex;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{GistError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Unauthenticated GitHub API client with rate limit tracking.
///
/// All request methods take `&self`, so one client can be shared between
/// concurrent page loads and avatar fetches.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a new client talking to `base_url` (e.g. `https://api.github.com`).
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gistview-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(GistError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Snapshot of the most recent rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.lock().clone()
    }

    /// Make a GET request with query parameters to an API endpoint.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(GistError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// GET an absolute URL (avatars live outside the API host).
    pub async fn get_absolute(&self, url: &str) -> Result<Response> {
        let url = Url::parse(url).map_err(|e| GistError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(GistError::Api)?;
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let mut rate_limit = self.rate_limit.lock();
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let rate_limit = self.rate_limit();
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(GistError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if rate_limit.limit > 0 && rate_limit.remaining == 0 =>
            {
                let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(GistError::RateLimited { reset_at })
            }
            status => Err(GistError::Http {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_sends_default_headers_and_tracks_rate_limit() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/public"))
            .and(query_param("page", "2"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("user-agent", "gistview-tui"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-limit", "60")
                    .insert_header("x-ratelimit-remaining", "59")
                    .insert_header("x-ratelimit-reset", "1700000000")
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri()).unwrap();
        client
            .get_with_params("/gists/public", &[("page", "2")])
            .await
            .unwrap();

        let rate_limit = client.rate_limit();
        assert_eq!(rate_limit.limit, 60);
        assert_eq!(rate_limit.remaining, 59);
        assert_eq!(rate_limit.reset, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_not_found_maps_to_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/missing/commits"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri()).unwrap();
        let err = client
            .get_with_params("/gists/missing/commits", &[("page", "1")])
            .await
            .unwrap_err();
        assert!(matches!(err, GistError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_maps_to_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/public"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-limit", "60")
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000"),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri()).unwrap();
        let err = client
            .get_with_params("/gists/public", &[("page", "1")])
            .await
            .unwrap_err();
        assert!(matches!(err, GistError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_malformed_absolute_url_is_fetch_error() {
        let client = GitHubClient::new(GITHUB_API_BASE).unwrap();
        let err = client.get_absolute("not a url").await.unwrap_err();

        assert!(matches!(err, GistError::InvalidUrl { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Fetch);
    }
}
