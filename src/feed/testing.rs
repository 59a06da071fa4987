//! Scripted in-memory article source for unit tests.

use crate::api::{ApiError, ArticleDetail, ArticleSource, ArticleSummary, Author, Tag};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) fn titled(id: u64, title: &str) -> ArticleSummary {
    ArticleSummary {
        id,
        title: title.to_string(),
        description: String::new(),
        cover_image: None,
        published_at: None,
        tags: vec!["rust".to_string()],
        author: Author {
            display_name: "Test Author".to_string(),
            handle: "tester".to_string(),
        },
        url: Some(format!("https://dev.to/tester/{id}")),
        reading_time_minutes: Some(3),
    }
}

pub(crate) fn article(id: u64) -> ArticleSummary {
    titled(id, &format!("Article {id}"))
}

/// `count` sequential articles starting at `first_id`.
pub(crate) fn page_of(first_id: u64, count: usize) -> Vec<ArticleSummary> {
    (first_id..first_id + count as u64).map(article).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List { page: u32, query: Option<String> },
    Tag { tag: String, page: u32 },
    Author { handle: String, page: u32 },
    Article(u64),
    Tags,
}

/// Serves the same page script for every listing endpoint and records calls.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    pages: Vec<Vec<ArticleSummary>>,
    articles: HashMap<u64, ArticleSummary>,
    fail_on_page: Option<u32>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, items: Vec<ArticleSummary>) -> Self {
        self.pages.push(items);
        self
    }

    pub(crate) fn with_article(mut self, article: ArticleSummary) -> Self {
        self.articles.insert(article.id, article);
        self
    }

    pub(crate) fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Page numbers of every listing call, in call order.
    pub(crate) fn list_pages(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List { page, .. } | Call::Tag { page, .. } | Call::Author { page, .. } => {
                    Some(page)
                }
                _ => None,
            })
            .collect()
    }

    fn page(&self, call: Call, page: u32) -> Result<Vec<ArticleSummary>, ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on_page == Some(page) {
            return Err(ApiError::HttpStatus(500));
        }
        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

impl ArticleSource for ScriptedSource {
    async fn list_articles(
        &self,
        page: u32,
        _per_page: u32,
        query: Option<&str>,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let call = Call::List {
            page,
            query: query.map(String::from),
        };
        self.page(call, page)
    }

    async fn list_articles_by_tag(
        &self,
        tag: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let call = Call::Tag {
            tag: tag.to_string(),
            page,
        };
        self.page(call, page)
    }

    async fn list_articles_by_author(
        &self,
        handle: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<ArticleSummary>, ApiError> {
        let call = Call::Author {
            handle: handle.to_string(),
            page,
        };
        self.page(call, page)
    }

    async fn get_article(&self, id: u64) -> Result<ArticleDetail, ApiError> {
        self.calls.lock().unwrap().push(Call::Article(id));
        self.articles
            .get(&id)
            .cloned()
            .map(|summary| ArticleDetail {
                summary,
                body_markdown: None,
            })
            .ok_or(ApiError::NotFound)
    }

    async fn list_tags(&self, _per_page: u32) -> Result<Vec<Tag>, ApiError> {
        self.calls.lock().unwrap().push(Call::Tags);
        Ok(Vec::new())
    }
}
