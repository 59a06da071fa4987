//! Integration tests for position restoration from a `pos` token.
//!
//! The clock is advanced by hand, in frame-sized steps, and handed to
//! `App::poll_scroll` the way the UI loop does on each wakeup.

mod common;

use common::{Harness, ScriptedSource};
use devfeed::app::{Move, Pane, PaneView, View};
use devfeed::feed;
use devfeed::nav::Location;
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(20);

/// Run frames until the location loses its `pos` token.
async fn restore(h: &mut Harness) -> usize {
    let mut now = Instant::now();
    for frame in 0..200 {
        h.run_tasks().await;
        h.render();
        h.app.poll_scroll(now);
        if h.app.location().pos().is_none() {
            return frame;
        }
        now += FRAME;
    }
    panic!("restoration never finished: {}", h.app.location());
}

#[tokio::test]
async fn test_restores_position_beyond_first_page() {
    let mut h = Harness::new(
        ScriptedSource::paged(6, 10, 0),
        Location::parse("/?pos=25").unwrap(),
    );
    restore(&mut h).await;

    assert_eq!(h.app.feed_view.selected, 25);
    // Centered in the five-row viewport.
    assert_eq!(h.app.feed_view.offset, 23);
    assert_eq!(h.app.location().to_string(), "/");
    assert!(!h.app.feed.is_restoring_scroll());
    // Pages were requested in order without repeats.
    let pages = h.source.list_pages();
    assert_eq!(&pages[..3], &[1, 2, 3]);
    assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
}

#[tokio::test]
async fn test_token_stays_while_layout_settles() {
    let mut h = Harness::new(
        ScriptedSource::paged(2, 10, 0),
        Location::parse("/?pos=4").unwrap(),
    );
    h.run_tasks().await;
    h.render();

    let start = Instant::now();
    h.app.poll_scroll(start);
    assert_eq!(h.app.feed_view.selected, 4);
    assert_eq!(h.app.feed_view.offset, 2);
    assert_eq!(h.app.location().pos(), Some(4));

    h.app.poll_scroll(start + Duration::from_millis(200));
    assert_eq!(h.app.location().pos(), Some(4));

    h.app.poll_scroll(start + Duration::from_millis(500));
    assert_eq!(h.app.location().pos(), None);
}

#[tokio::test]
async fn test_pane_never_laid_out_gives_up() {
    let mut h = Harness::new(
        ScriptedSource::paged(2, 10, 0),
        Location::parse("/?pos=4").unwrap(),
    );
    h.run_tasks().await;

    // Items are loaded but no frame lays them out, as with a terminal below
    // the minimum size.
    let mut now = Instant::now();
    for _ in 0..20 {
        h.app.poll_scroll(now);
        now += Duration::from_secs(1);
    }

    assert_eq!(h.app.feed_view.selected, 0);
    assert_eq!(h.app.location().to_string(), "/");
    assert!(!h.app.feed.is_restoring_scroll());
}

#[tokio::test]
async fn test_position_past_end_clamps_to_last_item() {
    let mut h = Harness::new(
        ScriptedSource::paged(1, 10, 5),
        Location::parse("/?pos=40&view=list").unwrap(),
    );
    restore(&mut h).await;

    assert_eq!(h.app.feed_view.selected, 14);
    assert_eq!(h.app.location().to_string(), "/?view=list");
    assert_eq!(h.source.list_pages(), vec![1, 2]);
}

#[tokio::test]
async fn test_empty_feed_abandons_restoration() {
    let mut h = Harness::new(ScriptedSource::new(), Location::parse("/?pos=3").unwrap());
    restore(&mut h).await;

    assert_eq!(h.app.location().to_string(), "/");
    assert!(h.ids(Pane::Feed).is_empty());
}

#[tokio::test]
async fn test_manual_move_cancels_restoration() {
    let mut h = Harness::new(
        ScriptedSource::paged(6, 10, 0),
        Location::parse("/?pos=45").unwrap(),
    );
    h.run_tasks().await;
    h.render();
    assert!(h.app.feed.is_restoring_scroll());

    h.app.move_selection(Pane::Feed, Move::Down);
    assert!(!h.app.feed.is_restoring_scroll());
    assert_eq!(h.app.location().to_string(), "/");

    h.app.poll_scroll(Instant::now() + Duration::from_secs(1));
    h.settle().await;
    assert_eq!(h.source.list_pages(), vec![1]);
    assert_eq!(h.app.feed_view.selected, 1);
}

#[tokio::test]
async fn test_author_pane_restores_its_own_cursor() {
    let mut h = Harness::new(
        ScriptedSource::paged(3, 10, 0),
        Location::parse("/author/ada?pos=12").unwrap(),
    );
    assert_eq!(h.app.view(), View::Author);
    restore(&mut h).await;

    assert_eq!(h.app.author_view.selected, 12);
    assert_eq!(h.app.feed_view.selected, 0);
    assert_eq!(h.app.location().to_string(), "/author/ada");
}

#[tokio::test]
async fn test_back_from_article_reloaded_feed_restores_cursor() {
    let mut h = Harness::new(ScriptedSource::paged(4, 10, 0), Location::feed());
    h.settle().await;
    for _ in 0..3 {
        h.app.move_selection(Pane::Feed, Move::Bottom);
        h.settle().await;
    }
    h.app.feed_view.selected = 22;
    h.render();

    h.app.open_selected();
    assert_eq!(h.app.location().to_string(), "/blog/23?pos=22");
    h.run_tasks().await;

    // The feed is reloaded while away, so going back has to page in again.
    let request = h.app.feed.reload().expect("reload claims the fetch slot");
    let result = feed::execute(&h.source, &request).await;
    h.app.on_page_loaded(Pane::Feed, request, result);
    h.app.feed_view = PaneView::default();
    assert_eq!(h.ids(Pane::Feed).len(), 10);
    h.app.go_back();
    assert_eq!(h.app.view(), View::Feed);

    restore(&mut h).await;
    assert_eq!(h.app.feed_view.selected, 22);
    assert_eq!(h.app.location().to_string(), "/");
}
