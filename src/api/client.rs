use super::types::{ApiError, ArticleDetail, ArticleSummary, Tag};
use super::ArticleSource;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Public Forem instance used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://dev.to/api";

/// Listing responses are a few KB per page; anything near this is not an
/// article listing.
const MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024;

/// reqwest-backed [`ArticleSource`] for the Forem REST API.
///
/// Every request (send and body read) runs under `timeout`. There are no
/// retries: a failed page ends the pagination session and the user retries.
#[derive(Clone)]
pub struct ForemClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ForemClient {
    /// Build a client for `base_url` (e.g. `https://dev.to/api`).
    ///
    /// HTTPS is required except for `localhost`/`127.0.0.1`, which the
    /// integration tests use.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("devfeed/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;

        tracing::debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "Created API client");

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Build `{base}/{segments..}?{query..}`.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");

        let request = async {
            let response = self
                .http
                .get(url.clone())
                .send()
                .await
                .map_err(ApiError::Network)?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::HttpStatus(status.as_u16()));
            }
            read_limited_bytes(response, MAX_RESPONSE_SIZE).await
        };

        let bytes = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))??;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Failed to decode response");
            ApiError::Parse(e.to_string())
        })
    }

    async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<ArticleSummary>, ApiError> {
        let url = self.endpoint(&["articles"], query)?;
        self.get_json(url).await
    }
}

impl ArticleSource for ForemClient {
    async fn list_articles(
        &self,
        page: u32,
        per_page: u32,
        query: Option<&str>,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        let mut params = vec![("page", page.as_str()), ("per_page", per_page.as_str())];
        if let Some(q) = query {
            params.push(("q", q));
        }
        self.list(&params).await
    }

    async fn list_articles_by_tag(
        &self,
        tag: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        self.list(&[
            ("tag", tag),
            ("page", page.as_str()),
            ("per_page", per_page.as_str()),
        ])
        .await
    }

    async fn list_articles_by_author(
        &self,
        handle: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        self.list(&[
            ("username", handle),
            ("page", page.as_str()),
            ("per_page", per_page.as_str()),
        ])
        .await
    }

    async fn get_article(&self, id: u64) -> Result<ArticleDetail, ApiError> {
        let id = id.to_string();
        let url = self.endpoint(&["articles", id.as_str()], &[])?;
        match self.get_json(url).await {
            Err(ApiError::HttpStatus(404)) => Err(ApiError::NotFound),
            other => other,
        }
    }

    async fn list_tags(&self, per_page: u32) -> Result<Vec<Tag>, ApiError> {
        let per_page = per_page.to_string();
        let url = self.endpoint(&["tags"], &[("per_page", per_page.as_str())])?;
        self.get_json(url).await
    }
}

fn parse_base_url(base: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base).map_err(|e| ApiError::InvalidBaseUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(base.to_string()));
    }

    match url.scheme() {
        "https" => {}
        "http" => {
            let is_localhost = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if !is_localhost {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS API base URL");
                return Err(ApiError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
        }
        _ => return Err(ApiError::InvalidBaseUrl(base.to_string())),
    }

    Ok(url)
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
