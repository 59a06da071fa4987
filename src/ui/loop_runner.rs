//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task results, scroll restoration
//! wakeups and a periodic tick.

use crate::api::ArticleSource;
use crate::app::{App, AppEvent};
use crate::preferences::{PreferenceManager, THEME_KEY};
use crate::storage::Database;
use crate::theme::ThemeVariant;
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::spawn_tasks;
use super::input::handle_input;
use super::render::render;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Result of handling a key press.
pub enum Action {
    Continue,
    Quit,
}

/// What the loop needs beyond [`App`]: the article source to spawn fetches
/// against and the preference store.
pub struct Services<S> {
    pub source: Arc<S>,
    /// `None` when the database could not be opened; preferences then live
    /// only in memory.
    pub db: Option<Database>,
    pub prefs: PreferenceManager,
}

impl<S> Services<S> {
    pub(super) async fn save_theme(&mut self, theme: ThemeVariant) {
        let Some(db) = &self.db else {
            return;
        };
        if let Err(e) = self.prefs.set(db, THEME_KEY, theme.as_str()).await {
            tracing::warn!(error = %e, "Failed to save theme preference");
        }
    }
}

/// Run the UI until the user quits or a termination signal arrives.
///
/// A panic hook restores the terminal before the default hook prints, so a
/// panic never leaves the terminal in raw mode.
pub async fn run<S: ArticleSource>(
    app: &mut App,
    services: &mut Services<S>,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
            app.after_render();
        }

        // Drain finished work before waiting on input so results are not
        // starved by rapid key presses.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event);
        }

        spawn_tasks(app, &services.source, &event_tx);

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        let scroll_wakeup = app.scroll_wakeup();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.needs_redraw = true;
                        match handle_input(app, services, key.code, key.modifiers).await {
                            Ok(Action::Quit) => break,
                            Ok(Action::Continue) => {}
                            Err(e) => app.set_status(format!("Error: {e}")),
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event stream error"),
                    None => break,
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event);
            }

            _ = sleep_until(scroll_wakeup) => {
                app.poll_scroll(Instant::now());
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now());
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Sleep until `deadline`, or forever without one.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
        }
        None => std::future::pending().await,
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
