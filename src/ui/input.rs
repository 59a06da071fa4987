//! Input handling for the TUI.
//!
//! Keys are resolved to actions through the keybinding registry using the
//! context of the current screen or overlay. Unbound printable keys in the
//! search box are typed into it.

use crate::api::ArticleSource;
use crate::app::{App, Move, View};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_url_for_open;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

use super::{Action, Services};

/// Main input dispatch function.
pub(super) async fn handle_input<S: ArticleSource>(
    app: &mut App,
    services: &mut Services<S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    let context = app.key_context();
    let action = app.keybindings.action_for_key(code, modifiers, context);

    let Some(action) = action else {
        if context == KbContext::Search {
            handle_search_typing(app, code, modifiers);
        }
        return Ok(Action::Continue);
    };

    match context {
        KbContext::Search => handle_search_action(app, action),
        KbContext::TagPicker => handle_tag_picker_action(app, action),
        KbContext::Help => handle_help_action(app, action),
        KbContext::Article => handle_article_action(app, action),
        _ => {}
    }

    match action {
        KbAction::Quit => return Ok(Action::Quit),
        KbAction::ToggleTheme => {
            let theme = app.toggle_theme();
            app.set_status(format!("Theme: {}", theme.name()));
            services.save_theme(theme).await;
        }
        KbAction::ShowHelp => app.show_help(),
        KbAction::Back => app.go_back(),
        KbAction::HistoryBack => app.history_back(),
        KbAction::OpenInBrowser => open_in_browser(app),
        KbAction::OpenAuthor => app.open_author(),
        _ if matches!(context, KbContext::Feed | KbContext::Author) => {
            handle_pane_action(app, action)
        }
        _ => {}
    }
    Ok(Action::Continue)
}

fn handle_pane_action(app: &mut App, action: KbAction) {
    let Some(pane) = app.active_pane() else {
        return;
    };
    let mv = match action {
        KbAction::NavDown => Some(Move::Down),
        KbAction::NavUp => Some(Move::Up),
        KbAction::NavLeft => Some(Move::Left),
        KbAction::NavRight => Some(Move::Right),
        KbAction::PageDown => Some(Move::PageDown),
        KbAction::PageUp => Some(Move::PageUp),
        KbAction::Top => Some(Move::Top),
        KbAction::Bottom => Some(Move::Bottom),
        _ => None,
    };
    if let Some(mv) = mv {
        app.move_selection(pane, mv);
        return;
    }

    match action {
        KbAction::Select => app.open_selected(),
        KbAction::ToggleView => app.toggle_view(),
        KbAction::Reload => app.reload(),
        KbAction::EnterSearch if app.view() == View::Feed => app.begin_search(),
        KbAction::OpenTags if app.view() == View::Feed => app.open_tags(),
        KbAction::ClearFilter => app.clear_filter(),
        _ => {}
    }
}

fn handle_article_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::ScrollDown => app.scroll_detail(1),
        KbAction::ScrollUp => app.scroll_detail(-1),
        KbAction::PageDown => app.page_detail(true),
        KbAction::PageUp => app.page_detail(false),
        _ => {}
    }
}

fn handle_search_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::CommitSearch => app.commit_search(),
        KbAction::CancelSearch => app.cancel_search(),
        _ => {}
    }
}

fn handle_search_typing(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char(c)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                && !c.is_control() =>
        {
            app.search_push(c, Instant::now())
        }
        KeyCode::Backspace => app.search_pop(Instant::now()),
        _ => {}
    }
}

fn handle_tag_picker_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::NavDown => app.move_overlay(true),
        KbAction::NavUp => app.move_overlay(false),
        KbAction::Select => app.select_tag(),
        KbAction::CloseOverlay => app.close_overlay(),
        _ => {}
    }
}

fn handle_help_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::NavDown => app.move_overlay(true),
        KbAction::NavUp => app.move_overlay(false),
        KbAction::CloseOverlay => app.close_overlay(),
        _ => {}
    }
}

fn open_in_browser(app: &mut App) {
    let Some(url) = app.focused_url().map(str::to_owned) else {
        app.set_status("Article has no URL");
        return;
    };
    // Only validated http(s) URLs reach the system opener.
    if let Err(e) = validate_url_for_open(&url) {
        tracing::warn!(url = %url, error = %e, "Refusing to open URL");
        app.set_status(format!("Cannot open URL: {e}"));
    } else if let Err(e) = open::that(&url) {
        tracing::warn!(url = %url, error = %e, "Failed to open browser");
        app.set_status(format!("Failed to open browser: {e}"));
    } else {
        app.set_status("Opened in browser");
    }
}
