//! Article panes: a card grid or a two-line list.
//!
//! Rendering records what was laid out (`rendered_count`, `last_visible`,
//! `columns`, `visible_rows`) in the pane's [`PaneView`] so navigation,
//! infinite loading and scroll restoration work from what is on screen.

use crate::api::ArticleSummary;
use crate::app::{App, Pane, PaneView};
use crate::feed::ViewMode;
use crate::theme::ColorPalette;
use crate::util::{format_published, format_tags, strip_control_chars, truncate_to_width, wrap_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Narrowest grid card, borders included.
const CARD_MIN_WIDTH: u16 = 32;
/// Two title lines, description, meta and tags plus borders.
const CARD_HEIGHT: u16 = 7;
const LIST_ROW_HEIGHT: u16 = 2;

pub(super) fn render(f: &mut Frame, app: &mut App, pane: Pane, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let Some(controller) = app.controller(pane) else {
        return;
    };
    let items = controller.state().shared_items();
    let mode = controller.view_mode();
    let loading = controller.state().is_loading();
    let exhausted = controller.state().is_exhausted();
    let error = controller.error().map(str::to_owned);
    let title = format!(" {} ({}) ", controller.scope().label(), items.len());

    let (palette, view) = match pane {
        Pane::Feed => (&app.palette, &mut app.feed_view),
        Pane::Author => (&app.palette, &mut app.author_view),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.card_border)
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if items.is_empty() {
        view.rendered_count = 0;
        view.last_visible = None;
        let msg = if let Some(error) = &error {
            format!("Failed to load articles: {error}")
        } else if loading {
            "Loading articles...".to_string()
        } else if exhausted {
            "No articles found".to_string()
        } else {
            String::new()
        };
        let style = if error.is_some() {
            palette.status_error
        } else {
            palette.meta
        };
        f.render_widget(
            Paragraph::new(msg).style(style).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let (columns, row_height) = match mode {
        ViewMode::Grid => ((inner.width / CARD_MIN_WIDTH).max(1), CARD_HEIGHT),
        ViewMode::List => (1, LIST_ROW_HEIGHT),
    };
    let visible_rows = (inner.height / row_height).max(1) as usize;
    layout_pane(view, items.len(), columns as usize, visible_rows);

    let card_width = inner.width / columns;
    let first = view.offset * view.columns;
    let Some(last) = view.last_visible else {
        return;
    };

    for (index, article) in items.iter().enumerate().take(last + 1).skip(first) {
        let slot = index - first;
        let row = (slot / view.columns) as u16;
        let col = (slot % view.columns) as u16;
        let cell = Rect {
            x: inner.x + col * card_width,
            y: inner.y + row * row_height,
            width: card_width,
            height: row_height.min(inner.height.saturating_sub(row * row_height)),
        };
        let selected = index == view.selected;
        match mode {
            ViewMode::Grid => render_card(f, palette, article, selected, cell),
            ViewMode::List => render_row(f, palette, article, selected, cell),
        }
    }
}

/// Clamp the cursor, scroll it into view and record what the frame shows.
///
/// Every loaded item has a row in the scrollable layout, on screen or not,
/// so `rendered_count` is the item count of the frame just laid out. It
/// trails the feed when items arrived after the last frame or when the pane
/// was not laid out at all (empty feed, terminal too small).
fn layout_pane(view: &mut PaneView, len: usize, columns: usize, visible_rows: usize) {
    view.columns = columns;
    view.visible_rows = visible_rows;
    view.selected = view.selected.min(len - 1);

    let total_rows = len.div_ceil(columns);
    let selected_row = view.selected / columns;
    if selected_row < view.offset {
        view.offset = selected_row;
    } else if selected_row >= view.offset + visible_rows {
        view.offset = selected_row + 1 - visible_rows;
    }
    view.offset = view.offset.min(total_rows.saturating_sub(visible_rows));

    view.rendered_count = len;
    let end = ((view.offset + visible_rows) * columns).min(len);
    view.last_visible = Some(end - 1);
}

fn meta_line(palette: &ColorPalette, article: &ArticleSummary, width: usize) -> Line<'static> {
    let author = strip_control_chars(&article.author.display_name);
    let author = if author.is_empty() {
        article.author.handle.clone()
    } else {
        author.into_owned()
    };
    let mut meta = format!("{author} · {}", format_published(article.published_at));
    if let Some(minutes) = article.reading_time_minutes {
        meta.push_str(&format!(" · {minutes} min"));
    }
    Line::from(vec![Span::styled(
        truncate_to_width(&meta, width).into_owned(),
        palette.meta,
    )])
}

fn render_card(
    f: &mut Frame,
    palette: &ColorPalette,
    article: &ArticleSummary,
    selected: bool,
    area: Rect,
) {
    let border = if selected {
        palette.card_border_selected
    } else {
        palette.card_border
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let width = inner.width as usize;
    if width == 0 {
        return;
    }

    let title = strip_control_chars(&article.title);
    let mut title_lines = wrap_to_width(&title, width);
    if title_lines.len() > 2 {
        let rest = title_lines[1..].join(" ");
        title_lines.truncate(1);
        title_lines.push(truncate_to_width(&format!("{rest}..."), width).into_owned());
    }

    let mut lines: Vec<Line> = title_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, palette.card_title)))
        .collect();
    while lines.len() < 2 {
        lines.push(Line::from(""));
    }
    let description = strip_control_chars(&article.description);
    lines.push(Line::from(Span::styled(
        truncate_to_width(&description, width).into_owned(),
        palette.card_description,
    )));
    lines.push(meta_line(palette, article, width));
    lines.push(Line::from(Span::styled(
        truncate_to_width(&format_tags(&article.tags), width).into_owned(),
        palette.tags,
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_row(
    f: &mut Frame,
    palette: &ColorPalette,
    article: &ArticleSummary,
    selected: bool,
    area: Rect,
) {
    let width = area.width.saturating_sub(2) as usize;
    let row_style = if selected {
        palette.list_selected
    } else {
        palette.list_row
    };
    let marker = if selected { "> " } else { "  " };
    let title = strip_control_chars(&article.title);

    let mut meta = meta_line(palette, article, width.saturating_sub(2));
    let tags = format_tags(&article.tags);
    if !tags.is_empty() {
        meta.spans.push(Span::styled(format!("  {tags}"), palette.tags));
    }
    meta.spans.insert(0, Span::raw("  "));

    let lines = vec![
        Line::from(vec![
            Span::styled(marker, row_style),
            Span::styled(truncate_to_width(&title, width).into_owned(), palette.card_title),
        ])
        .style(row_style),
        meta,
    ];
    f.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_scrolls_selection_into_view() {
        let mut view = PaneView {
            selected: 12,
            ..PaneView::default()
        };
        layout_pane(&mut view, 30, 1, 5);
        assert_eq!(view.offset, 8);
        assert_eq!(view.last_visible, Some(12));
        assert_eq!(view.rendered_count, 30);

        view.selected = 2;
        layout_pane(&mut view, 30, 1, 5);
        assert_eq!(view.offset, 2);
        assert_eq!(view.last_visible, Some(6));
    }

    #[test]
    fn test_layout_keeps_centered_offset() {
        let mut view = PaneView {
            selected: 25,
            offset: 23,
            ..PaneView::default()
        };
        layout_pane(&mut view, 60, 1, 5);
        assert_eq!(view.offset, 23);
        assert_eq!(view.last_visible, Some(27));
        // Rows below the viewport are laid out too.
        assert_eq!(view.rendered_count, 60);

        // Near the end the offset is clamped to the last full screen.
        view.selected = 58;
        view.offset = 56;
        layout_pane(&mut view, 60, 1, 5);
        assert_eq!(view.offset, 55);
        assert_eq!(view.last_visible, Some(59));
    }

    #[test]
    fn test_layout_grid_rows() {
        let mut view = PaneView {
            selected: 7,
            ..PaneView::default()
        };
        layout_pane(&mut view, 10, 3, 2);
        // Row 2 of 4 holds item 7; rows 1..=2 are shown.
        assert_eq!(view.offset, 1);
        assert_eq!(view.last_visible, Some(8));
    }

    #[test]
    fn test_layout_clamps_cursor_after_shrink() {
        let mut view = PaneView {
            selected: 40,
            offset: 35,
            ..PaneView::default()
        };
        layout_pane(&mut view, 10, 1, 4);
        assert_eq!(view.selected, 9);
        assert_eq!(view.offset, 6);
        assert_eq!(view.last_visible, Some(9));
    }
}
