//! Remote article source.
//!
//! The pagination core only talks to the [`ArticleSource`] trait, so tests can
//! script page contents and count calls while the binary uses [`ForemClient`]
//! against the public dev.to (Forem) API.
//!
//! - [`types`] - Article, author and tag records plus [`ApiError`]
//! - [`client`] - reqwest implementation with explicit timeouts and size caps

mod client;
mod types;

use std::future::Future;

pub use client::{ForemClient, DEFAULT_BASE_URL};
pub use types::{ApiError, ArticleDetail, ArticleSummary, Author, ErrorKind, Tag};

/// Read-only, page-numbered article listing.
///
/// Pages are 1-based. A page shorter than `per_page` is the last one. All
/// futures are `Send` so fetches can be moved onto `tokio::spawn`.
pub trait ArticleSource: Send + Sync + 'static {
    /// Latest articles. `query` is forwarded as the upstream `q` parameter,
    /// which the upstream only partially honours.
    fn list_articles(
        &self,
        page: u32,
        per_page: u32,
        query: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ArticleSummary>, ApiError>> + Send;

    fn list_articles_by_tag(
        &self,
        tag: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<ArticleSummary>, ApiError>> + Send;

    fn list_articles_by_author(
        &self,
        handle: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<ArticleSummary>, ApiError>> + Send;

    /// Single article by id. Fails with [`ApiError::NotFound`] when absent.
    fn get_article(&self, id: u64) -> impl Future<Output = Result<ArticleDetail, ApiError>> + Send;

    fn list_tags(&self, per_page: u32) -> impl Future<Output = Result<Vec<Tag>, ApiError>> + Send;
}
