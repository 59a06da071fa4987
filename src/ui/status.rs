use crate::app::{App, DetailState, SPINNER_FRAMES};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar.
///
/// Left: a transient status message, else the pane's loading, error or
/// end-of-feed state. Right: loaded count and page.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    let palette = &app.palette;
    let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
    let controller = app.active_pane().and_then(|p| app.controller(p));

    let (left, style) = if let Some((msg, _)) = &app.status_message {
        (msg.to_string(), palette.status_bar)
    } else if let Some(c) = controller {
        if let Some(error) = c.error() {
            (format!("Error: {error}"), palette.status_error)
        } else if c.state().is_loading() {
            (format!("{spinner} Loading page {}...", c.state().next_page()), palette.status_loading)
        } else if c.state().is_exhausted() {
            ("End of feed".to_string(), palette.status_end)
        } else {
            ("? help · / search · t tags · v layout · q quit".to_string(), palette.status_bar)
        }
    } else {
        match app.detail.as_ref().map(|d| &d.state) {
            Some(DetailState::Loading) => (format!("{spinner} Loading article..."), palette.status_loading),
            _ => ("Esc back · Backspace previous · o open · q quit".to_string(), palette.status_bar),
        }
    };

    let right = controller
        .map(|c| {
            let items = c.items().len();
            let noun = if items == 1 { "article" } else { "articles" };
            format!("{items} {noun} · page {} ", c.state().current_page())
        })
        .unwrap_or_default();

    let width = area.width as usize;
    let left = crate::util::truncate_to_width(&left, width.saturating_sub(right.len() + 1)).into_owned();
    let pad = width.saturating_sub(crate::util::display_width(&left) + right.len());

    let line = Line::from(vec![
        Span::styled(format!(" {left}"), style),
        Span::styled(" ".repeat(pad.saturating_sub(1)), palette.status_bar),
        Span::styled(right, palette.status_bar),
    ]);
    f.render_widget(Paragraph::new(line).style(palette.status_bar), area);
}
