use crate::api::{ApiError, ArticleDetail, ArticleSummary, Tag};
use crate::config::Config;
use crate::feed::{
    FeedController, FeedScope, FeedSettings, FilterContext, PageOutcome, PageRequest,
    ScrollAction,
};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::nav::{History, Location, Route};
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use lru::LruCache;
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a status message stays in the status bar.
const STATUS_TTL: Duration = Duration::from_secs(3);

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// ============================================================================
// Panes, views and background work
// ============================================================================

/// A paginated article list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Feed,
    Author,
}

/// What fills the screen, derived from the current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Author,
    Article,
}

/// Network work queued by state transitions. The UI loop drains these with
/// [`App::take_tasks`] and runs each on a spawned task.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchTask {
    Page { pane: Pane, request: PageRequest },
    Article { generation: u64, id: u64 },
    Tags { per_page: u32 },
}

impl FetchTask {
    pub fn name(&self) -> &'static str {
        match self {
            FetchTask::Page { .. } => "page_load",
            FetchTask::Article { .. } => "article_load",
            FetchTask::Tags { .. } => "tags_load",
        }
    }
}

/// Results posted back by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    PageLoaded {
        pane: Pane,
        request: PageRequest,
        result: Result<Vec<ArticleSummary>, ApiError>,
    },
    /// `generation` is the detail generation at spawn time; a mismatch means
    /// the user has since opened another article or left the detail view.
    ArticleLoaded {
        generation: u64,
        id: u64,
        result: Result<ArticleDetail, ApiError>,
    },
    TagsLoaded(Result<Vec<Tag>, ApiError>),
    /// The task running `fetch` panicked.
    TaskPanicked { fetch: FetchTask, error: String },
}

/// Per-pane cursor and the layout facts the last frame recorded.
#[derive(Debug, Clone, Default)]
pub struct PaneView {
    pub selected: usize,
    /// First visible row (list) or card row (grid).
    pub offset: usize,
    /// Items per row. 1 in list layout.
    pub columns: usize,
    /// Rows that fit on screen.
    pub visible_rows: usize,
    /// Items laid out by the last frame, on screen or not. Stays behind the
    /// feed until a frame lays out newly arrived items.
    pub rendered_count: usize,
    /// Index of the last item drawn, if any.
    pub last_visible: Option<usize>,
}

/// Cursor movement within a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

// ============================================================================
// Detail view, tags and overlays
// ============================================================================

#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    Loaded(Arc<ArticleDetail>),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DetailView {
    pub id: u64,
    pub state: DetailState,
    pub scroll: usize,
    /// Set by the renderer for paging and clamping.
    pub visible_lines: usize,
    pub content_lines: usize,
}

impl DetailView {
    fn scroll_by(&mut self, delta: isize) {
        let max = self.content_lines.saturating_sub(self.visible_lines);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}

#[derive(Debug, Clone, Default)]
pub enum TagsState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Arc<Vec<Tag>>),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    pub buffer: String,
    /// Set on every edit, cleared when the debounced query is applied.
    pub last_edit: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Search(SearchInput),
    /// Index 0 is the "all tags" entry.
    Tags { selected: usize },
    Help { scroll: usize },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state. Owned by the UI loop; never shared.
pub struct App {
    pub keybindings: KeybindingRegistry,
    pub theme_variant: ThemeVariant,
    pub palette: ColorPalette,

    pub feed: FeedController,
    /// Present while an author feed is (or was last) open.
    pub author: Option<FeedController>,
    pub feed_view: PaneView,
    pub author_view: PaneView,

    pub history: History,
    pub detail: Option<DetailView>,
    detail_generation: u64,
    article_cache: LruCache<u64, Arc<ArticleDetail>>,

    pub tags: TagsState,
    pub overlay: Option<Overlay>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    /// Skip frames when nothing changed.
    pub needs_redraw: bool,

    tasks: Vec<FetchTask>,
    settings: FeedSettings,
    search_debounce: Duration,
    tag_list_size: u32,
}

impl App {
    pub fn new(
        config: &Config,
        keybindings: KeybindingRegistry,
        theme: ThemeVariant,
        initial: Location,
    ) -> Self {
        let settings = config.feed_settings();
        let cache_size = NonZeroUsize::new(config.article_cache_size).unwrap_or(NonZeroUsize::MIN);

        let mut app = Self {
            keybindings,
            theme_variant: theme,
            palette: theme.palette(),
            feed: FeedController::new(settings),
            author: None,
            feed_view: PaneView::default(),
            author_view: PaneView::default(),
            history: History::new(initial.clone()),
            detail: None,
            detail_generation: 0,
            article_cache: LruCache::new(cache_size),
            tags: TagsState::NotLoaded,
            overlay: None,
            status_message: None,
            spinner_frame: 0,
            needs_redraw: true,
            tasks: Vec::new(),
            settings,
            search_debounce: config.search_debounce(),
            tag_list_size: config.tag_list_size,
        };
        app.enter(&initial);
        app
    }

    // -- Accessors ----------------------------------------------------------

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    pub fn view(&self) -> View {
        match self.location().route() {
            Route::Feed => View::Feed,
            Route::Author(_) => View::Author,
            Route::Article(_) => View::Article,
        }
    }

    /// The pane on screen, or `None` in the detail view.
    pub fn active_pane(&self) -> Option<Pane> {
        match self.view() {
            View::Feed => Some(Pane::Feed),
            View::Author => Some(Pane::Author),
            View::Article => None,
        }
    }

    pub fn controller(&self, pane: Pane) -> Option<&FeedController> {
        match pane {
            Pane::Feed => Some(&self.feed),
            Pane::Author => self.author.as_ref(),
        }
    }

    pub fn pane_view(&self, pane: Pane) -> &PaneView {
        match pane {
            Pane::Feed => &self.feed_view,
            Pane::Author => &self.author_view,
        }
    }

    pub fn pane_view_mut(&mut self, pane: Pane) -> &mut PaneView {
        match pane {
            Pane::Feed => &mut self.feed_view,
            Pane::Author => &mut self.author_view,
        }
    }

    fn pane_parts(&mut self, pane: Pane) -> Option<(&mut FeedController, &mut PaneView)> {
        match pane {
            Pane::Feed => Some((&mut self.feed, &mut self.feed_view)),
            Pane::Author => self.author.as_mut().map(|c| (c, &mut self.author_view)),
        }
    }

    pub fn selected_article(&self, pane: Pane) -> Option<&ArticleSummary> {
        let items = self.controller(pane)?.items();
        items.get(self.pane_view(pane).selected.min(items.len().saturating_sub(1)))
    }

    /// Key context for the current screen and overlay.
    pub fn key_context(&self) -> Context {
        match &self.overlay {
            Some(Overlay::Search(_)) => Context::Search,
            Some(Overlay::Tags { .. }) => Context::TagPicker,
            Some(Overlay::Help { .. }) => Context::Help,
            None => match self.view() {
                View::Feed => Context::Feed,
                View::Author => Context::Author,
                View::Article => Context::Article,
            },
        }
    }

    pub fn is_busy(&self) -> bool {
        let pane_loading = self
            .active_pane()
            .and_then(|p| self.controller(p))
            .is_some_and(|c| c.state().is_loading());
        let detail_loading = self
            .detail
            .as_ref()
            .is_some_and(|d| matches!(d.state, DetailState::Loading));
        pane_loading || detail_loading || matches!(self.tags, TagsState::Loading)
    }

    /// Drain queued network work.
    pub fn take_tasks(&mut self) -> Vec<FetchTask> {
        std::mem::take(&mut self.tasks)
    }

    fn queue_page(&mut self, pane: Pane, request: Option<PageRequest>) {
        if let Some(request) = request {
            self.tasks.push(FetchTask::Page { pane, request });
        }
    }

    // -- Status and theme ---------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self, now: Instant) -> bool {
        match &self.status_message {
            Some((_, shown)) if now.saturating_duration_since(*shown) >= STATUS_TTL => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }

    pub fn toggle_theme(&mut self) -> ThemeVariant {
        self.theme_variant = self.theme_variant.toggle();
        self.palette = self.theme_variant.palette();
        self.needs_redraw = true;
        self.theme_variant
    }

    // -- Navigation ---------------------------------------------------------

    /// Bring panes and the detail view in line with `location`.
    fn enter(&mut self, location: &Location) {
        match location.route() {
            Route::Feed => {
                self.detail = None;
                self.feed.set_view_mode(location.view());
                let request = match self.feed.set_filter(location.filter().clone()) {
                    Some(request) => {
                        self.feed_view = PaneView::default();
                        Some(request)
                    }
                    None => self.feed.mount(),
                };
                self.queue_page(Pane::Feed, request);
                if let Some(pos) = location.pos() {
                    self.feed.resolve_scroll_target(pos);
                }
            }
            Route::Author(handle) => {
                self.detail = None;
                let same_author = self
                    .author
                    .as_ref()
                    .is_some_and(|c| matches!(c.scope(), FeedScope::Author(h) if h == handle));
                if !same_author {
                    self.author = Some(FeedController::for_author(self.settings, handle.clone()));
                    self.author_view = PaneView::default();
                }
                let mut request = None;
                if let Some(author) = self.author.as_mut() {
                    author.set_view_mode(location.view());
                    request = author.mount();
                    if let Some(pos) = location.pos() {
                        author.resolve_scroll_target(pos);
                    }
                }
                self.queue_page(Pane::Author, request);
            }
            Route::Article(id) => self.open_detail(*id),
        }
        self.needs_redraw = true;
    }

    pub fn navigate(&mut self, location: Location) {
        self.history.push(location.clone());
        self.enter(&location);
    }

    /// Remember the cursor of the pane being left as the current entry's
    /// `pos`, so returning restores it.
    fn stamp_pos(&mut self) {
        if let Some(pane) = self.active_pane() {
            let pos = self.pane_view(pane).selected;
            let stamped = self.location().clone().with_pos(Some(pos));
            self.history.replace(stamped);
        }
    }

    pub fn open_selected(&mut self) {
        let Some(pane) = self.active_pane() else {
            return;
        };
        if let Some(id) = self.selected_article(pane).map(|a| a.id) {
            self.stamp_pos();
            let target = self.location().carry_to(Route::Article(id));
            self.navigate(target);
        }
    }

    /// Open the author of the selected or displayed article.
    pub fn open_author(&mut self) {
        let handle = match self.view() {
            View::Feed => self
                .selected_article(Pane::Feed)
                .map(|a| a.author.handle.clone()),
            View::Article => self.detail.as_ref().and_then(|d| match &d.state {
                DetailState::Loaded(article) => Some(article.summary.author.handle.clone()),
                _ => None,
            }),
            View::Author => None,
        };
        let Some(handle) = handle.filter(|h| !h.is_empty()) else {
            return;
        };
        self.stamp_pos();
        let target = self
            .location()
            .carry_to(Route::Author(handle))
            .with_pos(None);
        self.navigate(target);
    }

    /// "Back to articles": push the list this screen was reached from, with
    /// its `pos` so the cursor is restored.
    pub fn go_back(&mut self) {
        if self.view() == View::Feed {
            return;
        }
        let target = match self.history.previous() {
            Some(prev) if !matches!(prev.route(), Route::Article(_)) => prev.clone(),
            _ => self.location().back_to_feed(),
        };
        self.navigate(target);
    }

    /// Browser-style back.
    pub fn history_back(&mut self) {
        match self.history.back().cloned() {
            Some(location) => self.enter(&location),
            None => self.set_status("Nothing to go back to"),
        }
    }

    pub fn move_selection(&mut self, pane: Pane, mv: Move) {
        let Some((controller, view)) = self.pane_parts(pane) else {
            return;
        };
        let len = controller.items().len();
        if len == 0 {
            return;
        }
        let columns = view.columns.max(1);
        let page = view.visible_rows.max(1) * columns;
        let current = view.selected.min(len - 1);
        let next = match mv {
            Move::Down => current + columns,
            Move::Up => current.saturating_sub(columns),
            Move::Left => current.saturating_sub(1),
            Move::Right => current + 1,
            Move::PageDown => current + page,
            Move::PageUp => current.saturating_sub(page),
            Move::Top => 0,
            Move::Bottom => len - 1,
        };
        view.selected = next.min(len - 1);

        // Manual movement wins over a pending restoration.
        let restoring = controller.is_restoring_scroll();
        if restoring {
            controller.cancel_scroll_target();
        }
        let request = if next >= len {
            controller.request_more()
        } else {
            None
        };

        if restoring {
            self.strip_pos();
        }
        self.queue_page(pane, request);
    }

    fn strip_pos(&mut self) {
        if self.location().pos().is_some() {
            let stripped = self.location().without_pos();
            self.history.replace(stripped);
        }
    }

    // -- Feed triggers ------------------------------------------------------

    pub fn toggle_view(&mut self) {
        let Some(pane) = self.active_pane() else {
            return;
        };
        let mode = match pane {
            Pane::Feed => {
                let mode = self.feed.view_mode().toggle();
                self.feed.set_view_mode(mode);
                mode
            }
            Pane::Author => match self.author.as_mut() {
                Some(author) => {
                    let mode = author.view_mode().toggle();
                    author.set_view_mode(mode);
                    mode
                }
                None => return,
            },
        };
        let updated = self.location().clone().with_view(mode);
        self.history.replace(updated);
        self.needs_redraw = true;
    }

    pub fn reload(&mut self) {
        let Some(pane) = self.active_pane() else {
            return;
        };
        let Some((controller, view)) = self.pane_parts(pane) else {
            return;
        };
        let request = controller.reload();
        *view = PaneView::default();
        self.strip_pos();
        self.queue_page(pane, request);
    }

    /// Apply a new tag or query to the main feed. A real change pushes a
    /// fresh feed location and reloads from page 1.
    pub fn set_filter(&mut self, filter: FilterContext) {
        if filter == *self.feed.filter() && self.view() == View::Feed {
            return;
        }
        let target = Location::feed()
            .with_view(self.feed.view_mode())
            .with_filter(filter);
        self.navigate(target);
    }

    pub fn clear_filter(&mut self) {
        if !self.feed.filter().is_none() {
            self.set_filter(FilterContext::None);
        }
    }

    /// Feed the active pane the last visible index from the frame just drawn.
    pub fn after_render(&mut self) {
        let Some(pane) = self.active_pane() else {
            return;
        };
        let Some((controller, view)) = self.pane_parts(pane) else {
            return;
        };
        let request = view
            .last_visible
            .and_then(|last| controller.on_viewport(last));
        self.queue_page(pane, request);
    }

    /// Advance scroll restoration for the active pane.
    pub fn poll_scroll(&mut self, now: Instant) {
        let Some(pane) = self.active_pane() else {
            return;
        };
        let Some((controller, view)) = self.pane_parts(pane) else {
            return;
        };
        match controller.poll_scroll(view.rendered_count, now) {
            ScrollAction::None => {}
            ScrollAction::Fetch(request) => self.queue_page(pane, Some(request)),
            ScrollAction::JumpTo(index) => {
                view.selected = index;
                // Center the target row; the next layout clamps the offset.
                view.offset =
                    (index / view.columns.max(1)).saturating_sub(view.visible_rows / 2);
                self.needs_redraw = true;
            }
            ScrollAction::StripToken => {
                self.strip_pos();
                self.needs_redraw = true;
            }
        }
    }

    /// Earliest instant scroll restoration wants to run again.
    pub fn scroll_wakeup(&self) -> Option<Instant> {
        self.active_pane()
            .and_then(|p| self.controller(p))
            .and_then(FeedController::scroll_wakeup)
    }

    pub fn on_page_loaded(
        &mut self,
        pane: Pane,
        request: PageRequest,
        result: Result<Vec<ArticleSummary>, ApiError>,
    ) {
        let Some((controller, view)) = self.pane_parts(pane) else {
            tracing::debug!(?pane, page = request.page, "Dropping page for closed pane");
            return;
        };
        // A page for a feed the pane no longer shows.
        if request.scope != *controller.scope() {
            tracing::debug!(?pane, page = request.page, "Dropping page for another scope");
            return;
        }
        match controller.on_page_loaded(&request, result) {
            PageOutcome::Failed { page, error } => {
                self.set_status(format!("Failed to load page {page}: {error}"));
            }
            PageOutcome::Loaded { .. } | PageOutcome::Exhausted { .. } => {
                let len = controller.items().len();
                if len > 0 && view.selected >= len {
                    view.selected = len - 1;
                }
            }
            PageOutcome::Stale => {}
        }
    }

    /// A fetch task died without a result. Finish it as a failed fetch so
    /// the pane or overlay waiting on it stops loading.
    pub fn on_task_panicked(&mut self, fetch: FetchTask, error: String) {
        let task = fetch.name();
        tracing::error!(task, error = %error, "Task panic reported to UI");
        let aborted = ApiError::Aborted(error.clone());
        match fetch {
            FetchTask::Page { pane, request } => self.on_page_loaded(pane, request, Err(aborted)),
            FetchTask::Article { generation, id } => {
                self.on_article_loaded(generation, id, Err(aborted))
            }
            FetchTask::Tags { .. } => self.on_tags_loaded(Err(aborted)),
        }
        self.set_status(format!("Internal error in {task}: {error}"));
    }

    // -- Detail view --------------------------------------------------------

    fn open_detail(&mut self, id: u64) {
        self.detail_generation = self.detail_generation.wrapping_add(1);
        let state = match self.article_cache.get(&id) {
            Some(article) => {
                tracing::debug!(id, "Article cache hit");
                DetailState::Loaded(Arc::clone(article))
            }
            None => {
                self.tasks.push(FetchTask::Article {
                    generation: self.detail_generation,
                    id,
                });
                DetailState::Loading
            }
        };
        self.detail = Some(DetailView {
            id,
            state,
            scroll: 0,
            visible_lines: 0,
            content_lines: 0,
        });
    }

    pub fn on_article_loaded(
        &mut self,
        generation: u64,
        id: u64,
        result: Result<ArticleDetail, ApiError>,
    ) {
        let current = self
            .detail
            .as_ref()
            .is_some_and(|d| d.id == id && generation == self.detail_generation);
        if !current {
            tracing::debug!(id, generation, "Dropping stale article load");
            if let Ok(article) = result {
                self.article_cache.put(id, Arc::new(article));
            }
            return;
        }

        let state = match result {
            Ok(article) => {
                let article = Arc::new(article);
                self.article_cache.put(id, Arc::clone(&article));
                DetailState::Loaded(article)
            }
            Err(e) if e.is_not_found() => DetailState::NotFound,
            Err(e) => {
                tracing::warn!(id, error = %e, "Article load failed");
                DetailState::Failed(e.to_string())
            }
        };
        if let Some(detail) = self.detail.as_mut() {
            detail.state = state;
        }
    }

    pub fn scroll_detail(&mut self, delta: isize) {
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll_by(delta);
        }
    }

    pub fn page_detail(&mut self, down: bool) {
        if let Some(detail) = self.detail.as_mut() {
            let page = detail.visible_lines.saturating_sub(1).max(1) as isize;
            detail.scroll_by(if down { page } else { -page });
        }
    }

    /// Canonical URL of the article in focus.
    pub fn focused_url(&self) -> Option<&str> {
        match self.view() {
            View::Article => self.detail.as_ref().and_then(|d| match &d.state {
                DetailState::Loaded(article) => article.summary.url.as_deref(),
                _ => None,
            }),
            View::Feed => self.selected_article(Pane::Feed)?.url.as_deref(),
            View::Author => self.selected_article(Pane::Author)?.url.as_deref(),
        }
    }

    // -- Search -------------------------------------------------------------

    pub fn begin_search(&mut self) {
        let buffer = self.feed.filter().query_value().unwrap_or_default().to_string();
        self.overlay = Some(Overlay::Search(SearchInput {
            buffer,
            last_edit: None,
        }));
    }

    pub fn search_push(&mut self, c: char, now: Instant) {
        let Some(Overlay::Search(input)) = self.overlay.as_mut() else {
            return;
        };
        if input.buffer.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
            self.set_status(format!(
                "Search query too long (max {MAX_SEARCH_QUERY_LENGTH} chars)"
            ));
            return;
        }
        input.buffer.push(c);
        input.last_edit = Some(now);
    }

    pub fn search_pop(&mut self, now: Instant) {
        if let Some(Overlay::Search(input)) = self.overlay.as_mut() {
            if input.buffer.pop().is_some() {
                input.last_edit = Some(now);
            }
        }
    }

    /// Enter: apply immediately and close.
    pub fn commit_search(&mut self) {
        if let Some(Overlay::Search(input)) = self.overlay.take() {
            self.apply_search(&input.buffer);
        }
    }

    /// Esc: close, discarding edits not yet applied.
    pub fn cancel_search(&mut self) {
        if matches!(self.overlay, Some(Overlay::Search(_))) {
            self.overlay = None;
        }
    }

    /// Blank input clears the filter.
    fn apply_search(&mut self, raw: &str) {
        self.set_filter(FilterContext::query(raw));
    }

    /// Apply typed input once it has been idle for the debounce period.
    fn apply_debounced_search(&mut self, now: Instant) {
        let Some(Overlay::Search(input)) = self.overlay.as_mut() else {
            return;
        };
        let due = input
            .last_edit
            .is_some_and(|t| now.saturating_duration_since(t) >= self.search_debounce);
        if due {
            input.last_edit = None;
            let query = input.buffer.clone();
            self.apply_search(&query);
        }
    }

    // -- Tags ---------------------------------------------------------------

    pub fn open_tags(&mut self) {
        if matches!(self.tags, TagsState::NotLoaded | TagsState::Failed(_)) {
            self.tags = TagsState::Loading;
            self.tasks.push(FetchTask::Tags {
                per_page: self.tag_list_size,
            });
        }
        let selected = match (&self.tags, self.feed.filter().tag_value()) {
            (TagsState::Loaded(tags), Some(active)) => tags
                .iter()
                .position(|t| t.slug() == active)
                .map_or(0, |i| i + 1),
            _ => 0,
        };
        self.overlay = Some(Overlay::Tags { selected });
    }

    pub fn on_tags_loaded(&mut self, result: Result<Vec<Tag>, ApiError>) {
        self.tags = match result {
            Ok(tags) => {
                tracing::info!(count = tags.len(), "Tags loaded");
                TagsState::Loaded(Arc::new(tags))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tag list load failed");
                TagsState::Failed(e.to_string())
            }
        };
    }

    fn tag_entry_count(&self) -> usize {
        match &self.tags {
            TagsState::Loaded(tags) => tags.len() + 1,
            _ => 1,
        }
    }

    /// Selecting entry 0 clears the tag; any other sets it and drops the
    /// query.
    pub fn select_tag(&mut self) {
        let Some(Overlay::Tags { selected }) = self.overlay.take() else {
            return;
        };
        let filter = match (&self.tags, selected) {
            (_, 0) => FilterContext::None,
            (TagsState::Loaded(tags), i) => match tags.get(i - 1) {
                Some(tag) => FilterContext::tag(tag.slug()),
                None => return,
            },
            _ => return,
        };
        if filter.is_none() && self.feed.filter().tag_value().is_none() {
            return;
        }
        self.set_filter(filter);
    }

    // -- Overlays -----------------------------------------------------------

    pub fn show_help(&mut self) {
        self.overlay = Some(Overlay::Help { scroll: 0 });
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// j/k inside the tag picker or help overlay.
    pub fn move_overlay(&mut self, down: bool) {
        let entries = self.tag_entry_count();
        match self.overlay.as_mut() {
            Some(Overlay::Tags { selected }) => {
                *selected = if down {
                    (*selected + 1).min(entries - 1)
                } else {
                    selected.saturating_sub(1)
                };
            }
            Some(Overlay::Help { scroll }) => {
                *scroll = if down {
                    scroll.saturating_add(1)
                } else {
                    scroll.saturating_sub(1)
                };
            }
            _ => {}
        }
    }

    // -- Periodic work ------------------------------------------------------

    /// Spinner, status expiry, search debounce and scroll restoration.
    pub fn tick(&mut self, now: Instant) {
        if self.is_busy() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            self.needs_redraw = true;
        }
        if self.clear_expired_status(now) {
            self.needs_redraw = true;
        }
        self.apply_debounced_search(now);
        self.poll_scroll(now);
    }
}
