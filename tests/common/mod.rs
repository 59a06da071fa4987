//! Shared fixtures for the integration tests.
//!
//! `ScriptedSource` serves a fixed list of pages for every listing endpoint
//! and records each call. `Harness` plays the part of the UI loop: it runs
//! queued fetches to completion and lays the active pane out the way the
//! renderer does, without a terminal.

#![allow(dead_code)]

use devfeed::api::{ApiError, ArticleDetail, ArticleSource, ArticleSummary, Author, Tag};
use devfeed::app::{App, FetchTask, Pane};
use devfeed::config::Config;
use devfeed::feed;
use devfeed::keybindings::KeybindingRegistry;
use devfeed::nav::Location;
use devfeed::theme::ThemeVariant;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn titled(id: u64, title: &str) -> ArticleSummary {
    ArticleSummary {
        id,
        title: title.to_string(),
        description: format!("About {title}"),
        cover_image: None,
        published_at: None,
        tags: vec!["rust".to_string()],
        author: Author {
            display_name: "Ada".to_string(),
            handle: "ada".to_string(),
        },
        url: Some(format!("https://dev.to/ada/article-{id}")),
        reading_time_minutes: Some(5),
    }
}

/// `count` sequential articles starting at `first_id`.
pub fn page_of(first_id: u64, count: usize) -> Vec<ArticleSummary> {
    (first_id..first_id + count as u64)
        .map(|id| titled(id, &format!("Article {id}")))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { page: u32, query: Option<String> },
    Tag { tag: String, page: u32 },
    Author { handle: String, page: u32 },
    Article(u64),
    Tags,
}

#[derive(Default)]
pub struct ScriptedSource {
    pages: Vec<Vec<ArticleSummary>>,
    articles: HashMap<u64, ArticleSummary>,
    tags: Vec<Tag>,
    fail_on_page: Option<u32>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages of `per_page` sequential articles, then a final short page.
    pub fn paged(full_pages: usize, per_page: usize, last_page: usize) -> Self {
        let mut source = Self::new();
        let mut next_id = 1;
        for _ in 0..full_pages {
            source = source.with_page(page_of(next_id, per_page));
            next_id += per_page as u64;
        }
        if last_page > 0 {
            source = source.with_page(page_of(next_id, last_page));
        }
        source
    }

    pub fn with_page(mut self, items: Vec<ArticleSummary>) -> Self {
        self.pages.push(items);
        self
    }

    pub fn with_article(mut self, article: ArticleSummary) -> Self {
        self.articles.insert(article.id, article);
        self
    }

    pub fn with_tags(mut self, names: &[&str]) -> Self {
        self.tags = names
            .iter()
            .map(|name| Tag {
                name: name.to_string(),
                slug: None,
            })
            .collect();
        self
    }

    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Page numbers of every listing call, in call order.
    pub fn list_pages(&self) -> Vec<u32> {
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
            return Err(ApiError::HttpStatus(503));
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
                body_markdown: Some("Body text".to_string()),
            })
            .ok_or(ApiError::NotFound)
    }

    async fn list_tags(&self, _per_page: u32) -> Result<Vec<Tag>, ApiError> {
        self.calls.lock().unwrap().push(Call::Tags);
        Ok(self.tags.clone())
    }
}

pub fn test_config() -> Config {
    Config {
        per_page: 10,
        search_max_pages: 3,
        prefetch_margin: 3,
        ..Config::default()
    }
}

/// App plus a source, driven step by step.
pub struct Harness {
    pub app: App,
    pub source: ScriptedSource,
    /// Rows of the emulated viewport.
    pub rows: usize,
}

impl Harness {
    pub fn new(source: ScriptedSource, location: Location) -> Self {
        let app = App::new(
            &test_config(),
            KeybindingRegistry::new(),
            ThemeVariant::Dark,
            location,
        );
        Self {
            app,
            source,
            rows: 5,
        }
    }

    /// Run every queued fetch, including ones queued by the results, and
    /// return how many ran.
    pub async fn run_tasks(&mut self) -> usize {
        let mut ran = 0;
        loop {
            let tasks = self.app.take_tasks();
            if tasks.is_empty() {
                return ran;
            }
            for task in tasks {
                ran += 1;
                match task {
                    FetchTask::Page { pane, request } => {
                        let result = feed::execute(&self.source, &request).await;
                        self.app.on_page_loaded(pane, request, result);
                    }
                    FetchTask::Article { generation, id } => {
                        let result = self.source.get_article(id).await;
                        self.app.on_article_loaded(generation, id, result);
                    }
                    FetchTask::Tags { per_page } => {
                        let result = self.source.list_tags(per_page).await;
                        self.app.on_tags_loaded(result);
                    }
                }
            }
        }
    }

    /// Lay out the active pane as a single column of `rows` rows, then
    /// report the frame to the app.
    pub fn render(&mut self) {
        let Some(pane) = self.app.active_pane() else {
            return;
        };
        let len = self
            .app
            .controller(pane)
            .map(|c| c.items().len())
            .unwrap_or(0);
        let rows = self.rows;
        let view = self.app.pane_view_mut(pane);
        view.columns = 1;
        view.visible_rows = rows;
        if len == 0 {
            view.rendered_count = 0;
            view.last_visible = None;
        } else {
            view.selected = view.selected.min(len - 1);
            if view.selected < view.offset {
                view.offset = view.selected;
            } else if view.selected >= view.offset + rows {
                view.offset = view.selected + 1 - rows;
            }
            view.offset = view.offset.min(len.saturating_sub(rows));
            view.rendered_count = len;
            view.last_visible = Some((view.offset + rows).min(len) - 1);
        }
        self.app.needs_redraw = false;
        self.app.after_render();
    }

    /// Fetch and render until nothing new is queued.
    pub async fn settle(&mut self) {
        loop {
            self.run_tasks().await;
            self.render();
            if self.run_tasks().await == 0 {
                return;
            }
        }
    }

    pub fn ids(&self, pane: Pane) -> Vec<u64> {
        self.app
            .controller(pane)
            .map(|c| c.items().iter().map(|a| a.id).collect())
            .unwrap_or_default()
    }
}
