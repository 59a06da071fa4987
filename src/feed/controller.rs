use super::accumulator::FeedState;
use super::filter::{FeedScope, FilterContext, ViewMode};
use super::orchestrator::{FetchOrchestrator, PageRequest};
use super::scroll::{FeedObservation, ScrollDirective, ScrollPhase, ScrollRestore};
use super::search::DEFAULT_MAX_SEARCH_PAGES;
use crate::api::{ApiError, ArticleSummary};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Sizing knobs shared by every feed pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub per_page: u32,
    pub max_search_pages: u32,
    /// Load more once the last visible row is within this many rows of the end.
    pub prefetch_margin: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            per_page: 10,
            max_search_pages: DEFAULT_MAX_SEARCH_PAGES,
            prefetch_margin: 3,
        }
    }
}

/// Read-only view of a feed, published after every state transition.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub items: Arc<Vec<ArticleSummary>>,
    pub loading: bool,
    pub exhausted: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub filter: FilterContext,
    pub scope: FeedScope,
    pub view_mode: ViewMode,
}

/// What became of a completed page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Superseded by a filter change; nothing was touched.
    Stale,
    Loaded {
        page: u32,
        received: usize,
        exhausted: bool,
    },
    /// The page came back empty.
    Exhausted { page: u32 },
    Failed { page: u32, error: String },
}

/// What the caller should do after polling scroll restoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollAction {
    None,
    Fetch(PageRequest),
    JumpTo(usize),
    StripToken,
}

/// Owns one paginated feed: its accumulated items, the fetch guard, the
/// active filter and any pending scroll restoration.
///
/// Triggers that may start a fetch return the [`PageRequest`] to execute;
/// the caller runs it (typically on a spawned task) and hands the result to
/// [`on_page_loaded`](Self::on_page_loaded).
pub struct FeedController {
    state: FeedState,
    orchestrator: FetchOrchestrator,
    scroll: ScrollRestore,
    filter: FilterContext,
    scope: FeedScope,
    view_mode: ViewMode,
    error: Option<String>,
    settings: FeedSettings,
    tx: watch::Sender<FeedSnapshot>,
}

impl FeedController {
    /// Main feed, filtered by tag or query.
    pub fn new(settings: FeedSettings) -> Self {
        Self::with_scope(settings, FeedScope::Latest)
    }

    /// Feed pinned to one author's articles. Filters do not apply.
    pub fn for_author(settings: FeedSettings, handle: impl Into<String>) -> Self {
        Self::with_scope(settings, FeedScope::Author(handle.into()))
    }

    fn with_scope(settings: FeedSettings, scope: FeedScope) -> Self {
        let state = FeedState::new();
        let snapshot = FeedSnapshot {
            items: state.shared_items(),
            current_page: state.current_page(),
            scope: scope.clone(),
            ..FeedSnapshot::default()
        };
        let (tx, _rx) = watch::channel(snapshot);
        Self {
            state,
            orchestrator: FetchOrchestrator::new(settings.per_page, settings.max_search_pages),
            scroll: ScrollRestore::new(),
            filter: FilterContext::None,
            scope,
            view_mode: ViewMode::default(),
            error: None,
            settings,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.tx.borrow().clone()
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn items(&self) -> &[ArticleSummary] {
        self.state.items()
    }

    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }

    pub fn scope(&self) -> &FeedScope {
        &self.scope
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.orchestrator.generation()
    }

    pub fn scroll_phase(&self) -> ScrollPhase {
        self.scroll.phase()
    }

    /// A scroll target is armed and not yet resolved or abandoned.
    pub fn is_restoring_scroll(&self) -> bool {
        self.scroll.is_active()
    }

    pub fn scroll_wakeup(&self) -> Option<Instant> {
        self.scroll.next_wakeup()
    }

    pub fn is_author_feed(&self) -> bool {
        matches!(self.scope, FeedScope::Author(_))
    }

    /// Kick off the first page if nothing has been loaded or attempted yet.
    pub fn mount(&mut self) -> Option<PageRequest> {
        if !self.state.is_empty() || self.state.is_loading() || self.state.is_exhausted() {
            return None;
        }
        self.load_page(1)
    }

    /// Switch filter context. Resets and reloads only when it actually
    /// changes, so a tag replacing a query resets exactly once.
    pub fn set_filter(&mut self, filter: FilterContext) -> Option<PageRequest> {
        if self.is_author_feed() {
            tracing::warn!(scope = %self.scope.label(), "Ignoring filter change on author feed");
            return None;
        }
        if filter == self.filter {
            return None;
        }
        tracing::info!(from = %self.filter, to = %filter, "Filter changed");
        self.scope = filter.scope();
        self.filter = filter;
        self.reset();
        self.load_page(1)
    }

    /// Presentation only: no reset, no fetch.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.view_mode = mode;
        self.publish();
    }

    /// Start over under the current filter.
    pub fn reload(&mut self) -> Option<PageRequest> {
        tracing::info!(scope = %self.scope.label(), "Reloading feed");
        self.reset();
        self.load_page(1)
    }

    /// Load the next page unless exhausted or already loading.
    pub fn request_more(&mut self) -> Option<PageRequest> {
        if self.state.is_exhausted() || self.state.is_loading() {
            return None;
        }
        self.load_page(self.state.next_page())
    }

    /// Viewport proximity trigger. Ignored while loading, once exhausted and
    /// while the feed is still empty after a reset.
    pub fn on_viewport(&mut self, last_visible: usize) -> Option<PageRequest> {
        if self.state.is_empty() || self.state.is_loading() || self.state.is_exhausted() {
            return None;
        }
        if last_visible + self.settings.prefetch_margin + 1 < self.state.len() {
            return None;
        }
        self.request_more()
    }

    /// Claim the fetch slot for `page`. A no-op while another fetch is out.
    pub fn load_page(&mut self, page: u32) -> Option<PageRequest> {
        let request = self.orchestrator.begin(&self.scope, page)?;
        tracing::debug!(
            generation = request.generation,
            page,
            scope = %self.scope.label(),
            "Loading page"
        );
        self.state.set_loading(true);
        self.publish();
        Some(request)
    }

    /// Apply a finished fetch. Results from a superseded generation are
    /// dropped untouched; any failure ends pagination for this generation.
    pub fn on_page_loaded(
        &mut self,
        request: &PageRequest,
        result: Result<Vec<ArticleSummary>, ApiError>,
    ) -> PageOutcome {
        if !self.orchestrator.complete(request) {
            return PageOutcome::Stale;
        }
        self.state.set_loading(false);
        let page = request.page;

        let outcome = match result {
            Ok(items) if items.is_empty() => {
                tracing::info!(scope = %self.scope.label(), page, "Empty page, feed exhausted");
                self.state.mark_exhausted();
                PageOutcome::Exhausted { page }
            }
            Ok(items) => {
                let received = items.len();
                self.state.append(page, items);
                if received < request.per_page as usize || request.scope.is_one_shot() {
                    self.state.mark_exhausted();
                }
                let exhausted = self.state.is_exhausted();
                tracing::info!(
                    scope = %self.scope.label(),
                    page,
                    received,
                    total = self.state.len(),
                    exhausted,
                    "Page loaded"
                );
                PageOutcome::Loaded {
                    page,
                    received,
                    exhausted,
                }
            }
            Err(e) => {
                tracing::warn!(scope = %self.scope.label(), page, error = %e, "Page fetch failed");
                self.state.mark_exhausted();
                let error = e.to_string();
                self.error = Some(error.clone());
                PageOutcome::Failed { page, error }
            }
        };

        self.publish();
        outcome
    }

    /// Arm restoration to row `index`.
    pub fn resolve_scroll_target(&mut self, index: usize) {
        self.scroll.arm(index);
    }

    pub fn cancel_scroll_target(&mut self) {
        self.scroll.disarm();
    }

    /// Advance scroll restoration against the current feed and the number of
    /// rows the last frame drew.
    pub fn poll_scroll(&mut self, rendered_count: usize, now: Instant) -> ScrollAction {
        let observation = FeedObservation {
            item_count: self.state.len(),
            exhausted: self.state.is_exhausted(),
            loading: self.state.is_loading(),
            next_page: self.state.next_page(),
        };
        match self.scroll.step(observation, rendered_count, now) {
            ScrollDirective::Wait => ScrollAction::None,
            ScrollDirective::LoadPage(page) => match self.load_page(page) {
                Some(request) => ScrollAction::Fetch(request),
                None => ScrollAction::None,
            },
            ScrollDirective::JumpTo(index) => ScrollAction::JumpTo(index),
            ScrollDirective::StripToken => ScrollAction::StripToken,
        }
    }

    fn reset(&mut self) {
        self.orchestrator.invalidate();
        self.state.reset();
        self.scroll.disarm();
        self.error = None;
    }

    fn publish(&self) {
        self.tx.send_replace(FeedSnapshot {
            items: self.state.shared_items(),
            loading: self.state.is_loading(),
            exhausted: self.state.is_exhausted(),
            error: self.error.clone(),
            current_page: self.state.current_page(),
            filter: self.filter.clone(),
            scope: self.scope.clone(),
            view_mode: self.view_mode,
        });
    }
}
