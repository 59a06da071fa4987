use super::filter::FeedScope;
use super::search;
use crate::api::{ApiError, ArticleSource, ArticleSummary};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of generations for every orchestrator in the process, so a
/// request can never be mistaken for one issued by a replaced feed.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A ticket for one page fetch.
///
/// Carries everything needed to execute the fetch off the UI thread, plus the
/// generation it was issued under so the result can be checked for staleness
/// when it comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: u32,
    pub scope: FeedScope,
    pub per_page: u32,
    pub max_search_pages: u32,
}

/// One-in-flight guard keyed by filter generation.
///
/// The generation is replaced synchronously whenever the filter changes, which
/// also clears the in-flight slot; responses tagged with any other generation
/// are rejected by [`complete`](Self::complete). Generations are unique
/// process-wide, not just per orchestrator.
#[derive(Debug)]
pub struct FetchOrchestrator {
    generation: u64,
    in_flight: Option<u32>,
    per_page: u32,
    max_search_pages: u32,
}

impl FetchOrchestrator {
    pub fn new(per_page: u32, max_search_pages: u32) -> Self {
        Self {
            generation: next_generation(),
            in_flight: None,
            per_page: per_page.max(1),
            max_search_pages: max_search_pages.max(1),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a new generation. Anything still in flight becomes stale.
    pub fn invalidate(&mut self) -> u64 {
        self.generation = next_generation();
        if let Some(page) = self.in_flight.take() {
            tracing::debug!(page, generation = self.generation, "Superseding in-flight fetch");
        }
        self.generation
    }

    /// Claim the in-flight slot for `page`. `None` if a fetch is already out.
    pub fn begin(&mut self, scope: &FeedScope, page: u32) -> Option<PageRequest> {
        if let Some(pending) = self.in_flight {
            tracing::debug!(requested = page, pending, "Fetch already in flight, ignoring");
            return None;
        }
        self.in_flight = Some(page);
        Some(PageRequest {
            generation: self.generation,
            page,
            scope: scope.clone(),
            per_page: self.per_page,
            max_search_pages: self.max_search_pages,
        })
    }

    /// Release the slot for a finished request.
    ///
    /// Returns `false` when the request belongs to a superseded generation;
    /// its result must be discarded and the current slot is left untouched.
    pub fn complete(&mut self, request: &PageRequest) -> bool {
        if request.generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = request.generation,
                page = request.page,
                "Dropping stale page result (generation mismatch)"
            );
            return false;
        }
        self.in_flight = None;
        true
    }
}

/// Perform the fetch a [`PageRequest`] describes.
pub async fn execute<S: ArticleSource>(
    source: &S,
    request: &PageRequest,
) -> Result<Vec<ArticleSummary>, ApiError> {
    let PageRequest {
        page,
        per_page,
        max_search_pages,
        ..
    } = *request;

    match &request.scope {
        FeedScope::Latest => source.list_articles(page, per_page, None).await,
        FeedScope::Tag(tag) => source.list_articles_by_tag(tag, page, per_page).await,
        FeedScope::Author(handle) => {
            source
                .list_articles_by_author(handle, page, per_page)
                .await
        }
        FeedScope::Search(query) => search::scan(source, query, per_page, max_search_pages).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{page_of, Call, ScriptedSource};

    #[test]
    fn test_second_begin_is_noop_while_in_flight() {
        let mut orch = FetchOrchestrator::new(10, 5);
        let first = orch.begin(&FeedScope::Latest, 1);
        assert!(first.is_some());
        assert!(orch.begin(&FeedScope::Latest, 2).is_none());
        assert_eq!(orch.in_flight(), Some(1));
    }

    #[test]
    fn test_complete_frees_slot() {
        let mut orch = FetchOrchestrator::new(10, 5);
        let request = orch.begin(&FeedScope::Latest, 1).unwrap();
        assert!(orch.complete(&request));
        assert!(!orch.is_in_flight());
        assert!(orch.begin(&FeedScope::Latest, 2).is_some());
    }

    #[test]
    fn test_invalidate_clears_slot_and_rejects_old_results() {
        let mut orch = FetchOrchestrator::new(10, 5);
        let old = orch.begin(&FeedScope::Latest, 3).unwrap();

        orch.invalidate();
        assert!(!orch.is_in_flight());

        let fresh = orch
            .begin(&FeedScope::Tag("rust".to_string()), 1)
            .unwrap();
        assert!(!orch.complete(&old));
        // The stale completion must not free the new generation's slot.
        assert_eq!(orch.in_flight(), Some(1));
        assert!(orch.complete(&fresh));
    }

    #[test]
    fn test_separate_orchestrators_never_share_a_generation() {
        let mut first = FetchOrchestrator::new(10, 5);
        let mut second = FetchOrchestrator::new(10, 5);
        assert_ne!(first.generation(), second.generation());

        // A request from one guard cannot release the other's slot.
        let _pending = second.begin(&FeedScope::Latest, 1).unwrap();
        let foreign = first.begin(&FeedScope::Latest, 1).unwrap();
        assert!(!second.complete(&foreign));
        assert_eq!(second.in_flight(), Some(1));
    }

    #[test]
    fn test_zero_sizes_are_clamped() {
        let mut orch = FetchOrchestrator::new(0, 0);
        let request = orch.begin(&FeedScope::Latest, 1).unwrap();
        assert_eq!(request.per_page, 1);
        assert_eq!(request.max_search_pages, 1);
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_scope() {
        let source = ScriptedSource::new().with_page(page_of(1, 3));
        let mut orch = FetchOrchestrator::new(3, 5);

        for scope in [
            FeedScope::Latest,
            FeedScope::Tag("go".to_string()),
            FeedScope::Author("ada".to_string()),
        ] {
            let request = orch.begin(&scope, 1).unwrap();
            let items = execute(&source, &request).await.unwrap();
            assert_eq!(items.len(), 3);
            orch.complete(&request);
        }

        assert_eq!(
            source.calls(),
            vec![
                Call::List {
                    page: 1,
                    query: None
                },
                Call::Tag {
                    tag: "go".to_string(),
                    page: 1
                },
                Call::Author {
                    handle: "ada".to_string(),
                    page: 1
                },
            ]
        );
    }
}
