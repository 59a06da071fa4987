//! Background task helpers.
//!
//! Every fetch runs on its own spawned task and reports back through the
//! `AppEvent` channel. Panics inside a task are caught and reported as
//! `AppEvent::TaskPanicked`, carrying the fetch so the app can finish it
//! as a failure.

use crate::api::ArticleSource;
use crate::app::{App, AppEvent, FetchTask, Pane};
use crate::feed::{execute, PageRequest};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run `future`, converting a panic into `Err(message)`.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn everything `app` has queued.
pub(super) fn spawn_tasks<S: ArticleSource>(
    app: &mut App,
    source: &Arc<S>,
    tx: &mpsc::Sender<AppEvent>,
) {
    for task in app.take_tasks() {
        match task {
            FetchTask::Page { pane, request } => {
                spawn_page_load(Arc::clone(source), pane, request, tx.clone())
            }
            FetchTask::Article { generation, id } => {
                spawn_article_load(Arc::clone(source), generation, id, tx.clone())
            }
            FetchTask::Tags { per_page } => {
                spawn_tags_load(Arc::clone(source), per_page, tx.clone())
            }
        }
    }
}

fn spawn_page_load<S: ArticleSource>(
    source: Arc<S>,
    pane: Pane,
    request: PageRequest,
    tx: mpsc::Sender<AppEvent>,
) {
    tracing::debug!(?pane, page = request.page, generation = request.generation, "Spawning page load");
    let fetch = FetchTask::Page {
        pane,
        request: request.clone(),
    };
    spawn_guarded(fetch, tx, async move {
        let result = execute(source.as_ref(), &request).await;
        AppEvent::PageLoaded {
            pane,
            request,
            result,
        }
    });
}

fn spawn_article_load<S: ArticleSource>(
    source: Arc<S>,
    generation: u64,
    id: u64,
    tx: mpsc::Sender<AppEvent>,
) {
    tracing::debug!(id, generation, "Spawning article load");
    spawn_guarded(FetchTask::Article { generation, id }, tx, async move {
        let result = source.get_article(id).await;
        AppEvent::ArticleLoaded {
            generation,
            id,
            result,
        }
    });
}

fn spawn_tags_load<S: ArticleSource>(source: Arc<S>, per_page: u32, tx: mpsc::Sender<AppEvent>) {
    spawn_guarded(FetchTask::Tags { per_page }, tx, async move {
        AppEvent::TagsLoaded(source.list_tags(per_page).await)
    });
}

/// Spawn `work` for `fetch` and send the event it produces, or
/// `TaskPanicked` if it panics.
fn spawn_guarded<F>(fetch: FetchTask, tx: mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let task = fetch.name();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { fetch, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    });
}
