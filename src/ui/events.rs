//! Background task event processing.

use crate::app::{App, AppEvent};
use std::time::Instant;

/// Apply one finished background task to the app state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PageLoaded {
            pane,
            request,
            result,
        } => {
            app.on_page_loaded(pane, request, result);
            // Restoration waiting on this page moves on without the tick.
            app.poll_scroll(Instant::now());
        }
        AppEvent::ArticleLoaded {
            generation,
            id,
            result,
        } => app.on_article_loaded(generation, id, result),
        AppEvent::TagsLoaded(result) => {
            if let Err(e) = &result {
                app.set_status(format!("Failed to load tags: {e}"));
            }
            app.on_tags_loaded(result);
        }
        AppEvent::TaskPanicked { fetch, error } => {
            app.on_task_panicked(fetch, error);
            app.poll_scroll(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ArticleSummary, Author};
    use crate::app::{FetchTask, Pane};
    use crate::config::Config;
    use crate::feed::{PageRequest, ScrollPhase};
    use crate::keybindings::KeybindingRegistry;
    use crate::nav::Location;
    use crate::theme::ThemeVariant;
    use pretty_assertions::assert_eq;

    fn app_at(location: &str) -> App {
        let config = Config {
            per_page: 10,
            ..Config::default()
        };
        App::new(
            &config,
            KeybindingRegistry::new(),
            ThemeVariant::Dark,
            Location::parse(location).unwrap(),
        )
    }

    fn page_task(app: &mut App) -> (Pane, PageRequest) {
        match app.take_tasks().pop() {
            Some(FetchTask::Page { pane, request }) => (pane, request),
            other => panic!("expected a page task, got {other:?}"),
        }
    }

    fn articles(ids: std::ops::Range<u64>) -> Vec<ArticleSummary> {
        ids.map(|id| ArticleSummary {
            id,
            title: format!("Article {id}"),
            description: String::new(),
            cover_image: None,
            published_at: None,
            tags: vec![],
            author: Author {
                display_name: "Ada".to_string(),
                handle: "ada".to_string(),
            },
            url: None,
            reading_time_minutes: None,
        })
        .collect()
    }

    #[test]
    fn test_page_event_requests_next_page_for_restoration() {
        let mut app = app_at("/?pos=25");
        let (pane, request) = page_task(&mut app);

        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                pane,
                request,
                result: Ok(articles(1..11)),
            },
        );

        // No tick has run, yet page 2 is already queued.
        let (_, next) = page_task(&mut app);
        assert_eq!(next.page, 2);
        assert_eq!(
            app.feed.scroll_phase(),
            ScrollPhase::AwaitingData { target: 25 }
        );
    }

    #[test]
    fn test_panicked_page_load_releases_the_pane() {
        let mut app = app_at("/?pos=3");
        let (pane, request) = page_task(&mut app);

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                fetch: FetchTask::Page { pane, request },
                error: "boom".to_string(),
            },
        );

        assert!(!app.feed.state().is_loading());
        assert!(app.feed.error().is_some_and(|e| e.contains("boom")));
        // Restoration gave up on the empty feed instead of waiting.
        assert_eq!(app.location().to_string(), "/");
        app.reload();
        assert_eq!(page_task(&mut app).1.page, 1);
    }
}
