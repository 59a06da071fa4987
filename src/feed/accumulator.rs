use crate::api::ArticleSummary;
use std::collections::HashSet;
use std::sync::Arc;

/// Accumulated pages for one filter generation.
///
/// `items` is wrapped in `Arc` so snapshots handed to the renderer are O(1);
/// appends go through `Arc::make_mut`, which only clones when a snapshot is
/// still holding the previous vector.
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Arc<Vec<ArticleSummary>>,
    current_page: u32,
    exhausted: bool,
    loading: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            current_page: 1,
            exhausted: false,
            loading: false,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ArticleSummary] {
        &self.items
    }

    /// Cheap handle to the current item list.
    pub fn shared_items(&self) -> Arc<Vec<ArticleSummary>> {
        Arc::clone(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Page to request when the viewport asks for more.
    ///
    /// After a reset nothing has been loaded yet, so this is page 1 rather
    /// than `current_page + 1`.
    pub fn next_page(&self) -> u32 {
        if self.items.is_empty() {
            1
        } else {
            self.current_page.saturating_add(1)
        }
    }

    /// Drop everything and start over at page 1.
    pub fn reset(&mut self) {
        self.items = Arc::new(Vec::new());
        self.current_page = 1;
        self.exhausted = false;
        self.loading = false;
    }

    /// Merge a fetched page.
    ///
    /// Page 1 replaces the list outright. Later pages are concatenated and
    /// deduplicated by id: existing entries keep their positions, ids seen
    /// for the first time are appended in page order. An empty page changes
    /// nothing (and does not advance `current_page`).
    pub fn append(&mut self, page: u32, new_items: Vec<ArticleSummary>) {
        if page <= 1 {
            self.items = Arc::new(dedup_by_id(new_items));
            self.current_page = 1;
            return;
        }

        if new_items.is_empty() {
            return;
        }

        let items = Arc::make_mut(&mut self.items);
        let mut seen: HashSet<u64> = items.iter().map(|a| a.id).collect();
        items.reserve(new_items.len());
        for article in new_items {
            if seen.insert(article.id) {
                items.push(article);
            }
        }
        self.current_page = self.current_page.max(page);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// No further pages will be requested until the next reset.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}

/// Stable dedup keeping the first occurrence of every id.
pub(crate) fn dedup_by_id(items: Vec<ArticleSummary>) -> Vec<ArticleSummary> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|a| seen.insert(a.id)).collect()
}
