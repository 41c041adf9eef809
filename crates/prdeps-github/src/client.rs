//! GitHub REST client
//!
//! Fetches the pull request and comments a run needs to find its `deps:`
//! directive. Only plain authenticated GETs are used.

use async_trait::async_trait;
use prdeps_core::{IssueComment, PullRequest, PullRequestSource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LINK};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::GithubError;
use crate::Result;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const GITHUB_JSON: &str = "application/vnd.github+json";

/// Comments requested per page.
pub const COMMENTS_PER_PAGE: u32 = 100;

/// Upper bound on comment pages followed for one PR.
pub const MAX_COMMENT_PAGES: usize = 50;

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL
    pub api_url: String,
    /// Token sent as `Authorization: Bearer <token>`
    pub token: Option<String>,
    /// `User-Agent` header (GitHub rejects requests without one)
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: format!("prdeps/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GithubConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API server
    pub fn new(api_url: &str) -> Self {
        GithubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
            user_agent: format!("prdeps/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Default headers for every request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let token = self.token.as_deref().ok_or(GithubError::MissingToken)?;
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GithubError::Http(format!("invalid token: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        Ok(headers)
    }
}

/// GitHub client for pull request metadata
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a new client. Fails without a token.
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(config.headers()?)
            .build()?;

        Ok(GithubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GithubConfig::from_env())
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// API URL of pull request `number` in `owner/name`.
    pub fn pull_request_url(&self, repo: &str, number: u64) -> String {
        format!("{}/repos/{}/pulls/{}", self.config.api_url, repo, number)
    }

    /// GET `url`, decode the JSON body and return the `rel="next"` link.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<String>)> {
        debug!(url = %url, "GET");
        let mut request = self.http_client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        let status = response.status();
        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_url);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GithubError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok((serde_json::from_str(&body)?, next))
    }

    /// GET `url` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let (value, _) = self.get_page(url, &[]).await?;
        Ok(value)
    }

    /// Fetch a pull request by API URL
    pub async fn get_pull_request(&self, url: &str) -> Result<PullRequest> {
        info!("Retrieving PR information");
        self.get_json(url).await
    }

    /// Fetch every comment at `url` (a PR's `comments_url`), oldest first.
    ///
    /// GitHub pages this listing oldest first, so all pages are followed
    /// through the `Link` header before returning.
    pub async fn get_comments(&self, url: &str) -> Result<Vec<IssueComment>> {
        info!("Retrieving PR comments");
        let first_query = [("per_page", COMMENTS_PER_PAGE.to_string())];
        let (mut comments, mut next): (Vec<IssueComment>, _) =
            self.get_page(url, &first_query).await?;
        let mut pages = 1;

        while let Some(page_url) = next {
            if pages >= MAX_COMMENT_PAGES {
                warn!(url = %url, pages, "Comment page limit reached, newer comments ignored");
                break;
            }
            let (page, following): (Vec<IssueComment>, _) = self.get_page(&page_url, &[]).await?;
            comments.extend(page);
            next = following;
            pages += 1;
        }

        debug!(count = comments.len(), pages, "Fetched PR comments");
        Ok(comments)
    }
}

/// The `rel="next"` target of a `Link` header, if any.
///
/// `<https://api.github.com/...?page=2>; rel="next", <...>; rel="last"`
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';').map(str::trim);
        let target = parts.next()?;
        let is_next = parts.any(|p| p == "rel=\"next\"");
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        is_next.then(|| url.to_string())
    })
}

#[async_trait]
impl PullRequestSource for GithubClient {
    async fn pull_request(&self, url: &str) -> prdeps_core::Result<PullRequest> {
        Ok(self.get_pull_request(url).await?)
    }

    async fn comments(&self, url: &str) -> prdeps_core::Result<Vec<IssueComment>> {
        Ok(self.get_comments(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_config_new_trims_slash() {
        let config = GithubConfig::new("https://ghe.example.com/api/v3/");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert!(config.token.is_none());
        assert!(config.user_agent.starts_with("prdeps/"));
    }

    #[test]
    fn test_headers_require_token() {
        let config = GithubConfig::new(DEFAULT_API_URL);
        assert!(matches!(config.headers(), Err(GithubError::MissingToken)));
        assert!(matches!(
            GithubClient::new(config),
            Err(GithubError::MissingToken)
        ));
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let headers = GithubConfig::new(DEFAULT_API_URL)
            .with_token("ghs_secret")
            .headers()
            .unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer ghs_secret");
        assert_eq!(headers[ACCEPT], GITHUB_JSON);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_next_page_url() {
        let header = r#"<https://api.github.com/repositories/1/issues/9/comments?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/issues/9/comments?per_page=100&page=4>; rel="last""#;
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/repositories/1/issues/9/comments?per_page=100&page=2")
        );

        let last_page = r#"<https://x/c?page=1>; rel="first", <https://x/c?page=3>; rel="prev""#;
        assert!(next_page_url(last_page).is_none());
        assert!(next_page_url("garbage").is_none());
    }

    #[test]
    fn test_pull_request_url() {
        let client =
            GithubClient::new(GithubConfig::new(DEFAULT_API_URL).with_token("t")).unwrap();
        assert_eq!(
            client.pull_request_url("jitsi/jicofo", 12),
            "https://api.github.com/repos/jitsi/jicofo/pulls/12"
        );
    }
}
