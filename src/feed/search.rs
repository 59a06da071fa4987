//! Bounded free-text search.
//!
//! The upstream `q` parameter is only partially honoured, so each scanned page
//! is also filtered locally by title. The scan is capped and its result is
//! final: search never paginates further.

use crate::api::{ApiError, ArticleSource, ArticleSummary};
use std::collections::HashSet;

/// Upper bound on pages scanned when none is configured.
pub const DEFAULT_MAX_SEARCH_PAGES: u32 = 5;

/// Run the search for `query`.
///
/// An all-digit query is an id lookup: one `get_article` call, no listing.
/// A missing id yields an empty result rather than an error.
pub async fn scan<S: ArticleSource>(
    source: &S,
    query: &str,
    per_page: u32,
    max_pages: u32,
) -> Result<Vec<ArticleSummary>, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(id) = parse_article_id(query) {
        tracing::debug!(id, "Numeric query, looking up article by id");
        return match source.get_article(id).await {
            Ok(detail) => Ok(vec![detail.summary]),
            Err(ApiError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        };
    }

    let needle = query.to_lowercase();
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for page in 1..=max_pages.max(1) {
        let results = source.list_articles(page, per_page, Some(query)).await?;
        if results.is_empty() {
            tracing::debug!(page, "Search scan reached an empty page");
            break;
        }
        let scanned = results.len();
        matches.extend(
            results
                .into_iter()
                .filter(|a| a.title.to_lowercase().contains(&needle))
                .filter(|a| seen.insert(a.id)),
        );
        tracing::debug!(page, scanned, matched = matches.len(), "Scanned search page");
    }

    Ok(matches)
}

/// `Some(id)` when the whole query is ASCII digits that fit an id.
fn parse_article_id(query: &str) -> Option<u64> {
    if query.bytes().all(|b| b.is_ascii_digit()) {
        query.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{titled, Call, ScriptedSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_article_id() {
        assert_eq!(parse_article_id("12345"), Some(12345));
        assert_eq!(parse_article_id("12a45"), None);
        assert_eq!(parse_article_id("-1"), None);
        assert_eq!(parse_article_id("99999999999999999999999"), None);
    }

    #[tokio::test]
    async fn test_numeric_query_is_single_lookup() {
        let source = ScriptedSource::new().with_article(titled(12345, "By id"));

        let results = scan(&source, "12345", 10, 5).await.unwrap();

        assert_eq!(results, vec![titled(12345, "By id")]);
        assert_eq!(source.calls(), vec![Call::Article(12345)]);
    }

    #[tokio::test]
    async fn test_numeric_query_missing_id_is_empty() {
        let source = ScriptedSource::new();
        let results = scan(&source, "777", 10, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_filters_titles_case_insensitively_and_dedups() {
        let source = ScriptedSource::new()
            .with_page(vec![titled(1, "Learning RUST"), titled(2, "Go tips")])
            .with_page(vec![titled(3, "rusty nails"), titled(1, "Learning RUST")])
            .with_page(vec![titled(4, "Python")]);

        let results = scan(&source, "Rust", 2, 5).await.unwrap();
        let ids: Vec<u64> = results.iter().map(|a| a.id).collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_stops_at_empty_page() {
        let source = ScriptedSource::new()
            .with_page(vec![titled(1, "rust")])
            .with_page(Vec::new())
            .with_page(vec![titled(3, "rust")]);

        let results = scan(&source, "rust", 1, 5).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(source.list_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_scan_bounded_by_max_pages() {
        let mut source = ScriptedSource::new();
        for id in 1..=10 {
            source = source.with_page(vec![titled(id, "rust")]);
        }

        let results = scan(&source, "rust", 1, 5).await.unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(source.list_pages(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let source = ScriptedSource::new()
            .with_page(vec![titled(1, "rust")])
            .failing_on_page(2);

        let result = scan(&source, "rust", 1, 5).await;
        assert!(matches!(result, Err(ApiError::HttpStatus(500))));
    }
}
