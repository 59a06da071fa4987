//! Search box and tag picker overlays.

use crate::app::{App, SearchInput, TagsState, SPINNER_FRAMES};
use crate::util::{truncate_to_width, MAX_SEARCH_QUERY_LENGTH};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::centered_rect;

pub(super) fn render_search(f: &mut Frame, app: &App, input: &SearchInput) {
    let area = f.area();
    let width = area.width.saturating_mul(3) / 5;
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + 2,
        width,
        height: 3,
    };
    if rect.width < 10 || rect.bottom() > area.bottom() {
        return;
    }
    f.render_widget(Clear, rect);

    let palette = &app.palette;
    let count = input.buffer.chars().count();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.overlay_border)
        .title(" Search titles ")
        .title_bottom(Line::from(Span::styled(
            format!(" Enter search · Esc cancel · {count}/{MAX_SEARCH_QUERY_LENGTH} "),
            palette.meta,
        )));
    let inner = block.inner(rect);

    // Keep the tail (where the cursor is) visible for long input.
    let shown = tail_to_width(&input.buffer, inner.width.saturating_sub(1) as usize);
    let line = Line::from(vec![
        Span::styled(shown, palette.input),
        Span::styled("_", palette.overlay_selected),
    ]);
    f.render_widget(Paragraph::new(line).block(block), rect);
}

fn tail_to_width(s: &str, width: usize) -> String {
    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for c in s.chars().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        tail.push(c);
    }
    tail.into_iter().rev().collect()
}

pub(super) fn render_tags(f: &mut Frame, app: &App, selected: usize) {
    let rect = centered_rect(50, 70, f.area());
    if rect.width < 16 || rect.height < 5 {
        return;
    }
    f.render_widget(Clear, rect);

    let palette = &app.palette;
    let active = app.feed.filter().tag_value();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.overlay_border)
        .title(" Filter by tag ")
        .title_bottom(Line::from(Span::styled(
            " Enter select · Esc close ",
            palette.meta,
        )));

    let tags = match &app.tags {
        TagsState::Loaded(tags) => tags,
        TagsState::Loading | TagsState::NotLoaded => {
            let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
            let msg = Paragraph::new(format!("{spinner} Loading tags..."))
                .style(palette.status_loading)
                .block(block);
            f.render_widget(msg, rect);
            return;
        }
        TagsState::Failed(error) => {
            let msg = Paragraph::new(format!("Failed to load tags: {error}"))
                .style(palette.detail_error)
                .block(block);
            f.render_widget(msg, rect);
            return;
        }
    };

    let width = rect.width.saturating_sub(4) as usize;
    let mark = |on: bool| if on { "* " } else { "  " };
    let mut items = Vec::with_capacity(tags.len() + 1);
    items.push(ListItem::new(format!("{}All tags", mark(active.is_none()))));
    items.extend(tags.iter().map(|tag| {
        let label = format!("{}#{}", mark(active == Some(tag.slug())), tag.name);
        ListItem::new(truncate_to_width(&label, width).into_owned())
    }));

    let list = List::new(items)
        .block(block)
        .style(palette.list_row)
        .highlight_style(palette.overlay_selected);
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, rect, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_to_width_keeps_end() {
        assert_eq!(tail_to_width("hello world", 5), "world");
        assert_eq!(tail_to_width("short", 10), "short");
        assert_eq!(tail_to_width("日本語", 4), "本語");
    }
}
