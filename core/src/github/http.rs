//! GitHub REST client for the code search endpoint

use super::client::CodeSearchClient;
use super::types::{
    AuthenticatedUser, GitHubErrorResponse, PageRequest, ResultPage, SearchResponse,
};
use crate::config::SearchConfig;
use crate::error::{ConfigError, Error, Result, SearchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Media type that asks GitHub to include `text_matches` in search hits
pub const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.v3.text-match+json";

/// Media type for plain REST calls
pub const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
const RETRY_AFTER: &str = "retry-after";

/// Wait suggested when GitHub signals a rate limit without a reset time
const FALLBACK_RATE_LIMIT_WAIT_SECS: u64 = 60;

/// HTTP client for the GitHub code search API
pub struct GitHubClient {
    client: Client,
    base_url: Url,
}

impl GitHubClient {
    /// Create a new client from resolved search config
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let client = Client::builder()
            .user_agent(concat!("ghsearch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, SearchError> {
        self.base_url
            .join(path)
            .map_err(|e| SearchError::Network {
                message: format!("Invalid endpoint {}: {}", path, e),
            })
    }

    async fn send_search(
        &self,
        request: &PageRequest,
        token: &str,
    ) -> std::result::Result<ResultPage, SearchError> {
        let url = self.endpoint("search/code")?;
        debug!(
            "GET {} q={:?} page={} per_page={}",
            url, request.query, request.page, request.per_page
        );

        let per_page = request.per_page.to_string();
        let page = request.page.to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("q", request.query.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ])
            .header(ACCEPT, TEXT_MATCH_MEDIA_TYPE)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(translate_error(response).await);
        }

        let body: SearchResponse = response.json().await.map_err(|e| SearchError::Network {
            message: format!("Failed to parse response: {}", e),
        })?;

        debug!(
            "Search returned {} items (total_count={})",
            body.items.len(),
            body.total_count
        );

        Ok(ResultPage {
            items: body.items,
            total_count: body.total_count,
            page: request.page,
        })
    }
}

#[async_trait]
impl CodeSearchClient for GitHubClient {
    async fn search_code(
        &self,
        request: &PageRequest,
        token: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<ResultPage, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Search for {:?} page {} aborted", request.query, request.page);
                Err(SearchError::Cancelled)
            }
            result = self.send_search(request, token) => result,
        }
    }

    async fn validate_token(
        &self,
        token: &str,
    ) -> std::result::Result<AuthenticatedUser, SearchError> {
        let url = self.endpoint("user")?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SearchError::InvalidToken);
        }
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: format!(
                    "GitHub API error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
            });
        }

        response.json().await.map_err(|e| SearchError::Network {
            message: format!("Failed to parse user response: {}", e),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // `Url::join` replaces the last segment unless the base ends with a slash
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized).map_err(|_| {
        Error::from(ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: raw.to_string(),
        })
    })
}

fn network_error(err: reqwest::Error) -> SearchError {
    SearchError::Network {
        message: err.to_string(),
    }
}

/// Map a non-2xx response to a structured error
async fn translate_error(response: Response) -> SearchError {
    let status = response.status();

    if let Some(wait_seconds) = rate_limit_wait(status, response.headers()) {
        warn!("GitHub rate limit hit, retry in {}s", wait_seconds);
        return SearchError::RateLimit { wait_seconds };
    }

    let body: GitHubErrorResponse = response.json().await.unwrap_or_default();
    let message = if body.message.is_empty() {
        format!(
            "Failed to fetch code results: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    } else {
        body.message
    };

    warn!("GitHub API error {}: {}", status.as_u16(), message);
    SearchError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Seconds until the rate limit resets, if the response signals one
fn rate_limit_wait(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if status == StatusCode::FORBIDDEN && header_str(headers, RATE_LIMIT_REMAINING) == Some("0") {
        let wait = header_str(headers, RATE_LIMIT_RESET)
            .and_then(|reset| reset.trim().parse::<i64>().ok())
            .map(|reset| (reset - chrono::Utc::now().timestamp()).max(0) as u64)
            .unwrap_or(FALLBACK_RATE_LIMIT_WAIT_SECS);
        return Some(wait);
    }

    // Secondary rate limits answer 429 with a Retry-After header
    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = header_str(headers, RETRY_AFTER)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(FALLBACK_RATE_LIMIT_WAIT_SECS);
        return Some(wait);
    }

    None
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
