use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by an [`ArticleSource`](super::ArticleSource).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Article not found")]
    NotFound,
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure API base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The task running the request died before it produced a result.
    #[error("Request aborted: {0}")]
    Aborted(String),
}

/// Coarse classification used by the UI to pick a message and by the
/// detail view to decide between a not-found state and an error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    NotFound,
    Parse,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Parse(_) | ApiError::ResponseTooLarge(_) => ErrorKind::Parse,
            ApiError::Timeout(_)
            | ApiError::Network(_)
            | ApiError::HttpStatus(_)
            | ApiError::InvalidBaseUrl(_)
            | ApiError::InsecureBaseUrl
            | ApiError::Aborted(_) => ErrorKind::Network,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

// ============================================================================
// Article Types
// ============================================================================

/// Author attribution attached to every article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Author {
    #[serde(rename = "name", default, deserialize_with = "null_as_empty")]
    pub display_name: String,
    #[serde(rename = "username")]
    pub handle: String,
}

/// One entry of a paginated article listing.
///
/// Identity is `id`; two summaries with the same id are the same article even
/// if other fields differ (the upstream may edit titles between page fetches).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleSummary {
    pub id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Listing responses send `tag_list` as an array, the single-article
    /// response sends it as a comma-separated string. Both decode here.
    #[serde(rename = "tag_list", default, deserialize_with = "deserialize_tag_list")]
    pub tags: Vec<String>,
    #[serde(rename = "user")]
    pub author: Author,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reading_time_minutes: Option<u32>,
}

/// Full article as returned by the by-id endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    #[serde(default)]
    pub body_markdown: Option<String>,
}

/// A tag as listed by the tags endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Tag {
    /// Value to send as the `tag` filter. The upstream rarely populates
    /// `slug`, so the name is used when it is missing.
    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Deserialization Helpers
// ============================================================================

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagList {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<TagList>::deserialize(deserializer)? {
        Some(TagList::List(tags)) => tags,
        Some(TagList::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    })
}
