//! Render dispatch: header, main view, status bar and overlays.

use crate::app::{App, Overlay, Pane, View};
use crate::feed::ViewMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{detail, feed, help, overlays, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view() {
        View::Feed => feed::render(f, app, Pane::Feed, chunks[1]),
        View::Author => feed::render(f, app, Pane::Author, chunks[1]),
        View::Article => detail::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    match &app.overlay {
        Some(Overlay::Search(input)) => overlays::render_search(f, app, input),
        Some(Overlay::Tags { selected }) => overlays::render_tags(f, app, *selected),
        Some(Overlay::Help { scroll }) => help::render(f, app, *scroll),
        None => {}
    }
}

/// App name, what the pane shows and the current location.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let mut spans = vec![Span::styled(" devfeed ", palette.header)];

    let pane = app.active_pane().and_then(|p| app.controller(p));
    if let Some(controller) = pane {
        let mode = match controller.view_mode() {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        };
        spans.push(Span::styled(
            format!("{} · {mode} ", controller.scope().label()),
            palette.header_filter,
        ));
    }

    let location = app.location().to_string();
    spans.push(Span::styled(location, palette.meta));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
