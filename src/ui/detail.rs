//! Single article view.

use crate::api::ArticleDetail;
use crate::app::{App, DetailState, SPINNER_FRAMES};
use crate::theme::ColorPalette;
use crate::util::{format_published, format_tags, strip_control_chars, wrap_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(super) fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
    let palette = &app.palette;
    let Some(detail) = app.detail.as_mut() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.card_border)
        .title(format!(" Article {} ", detail.id))
        .title_bottom(Line::from(Span::styled(
            " Esc back · o open in browser · a author ",
            palette.meta,
        )));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let lines = match &detail.state {
        DetailState::Loading => vec![Line::from(Span::styled(
            format!("{spinner} Loading article..."),
            palette.status_loading,
        ))],
        DetailState::NotFound => vec![Line::from(Span::styled(
            "Article not found",
            palette.detail_error,
        ))],
        DetailState::Failed(error) => vec![Line::from(Span::styled(
            format!("Failed to load article: {error}"),
            palette.detail_error,
        ))],
        DetailState::Loaded(article) => article_lines(palette, article, width),
    };

    detail.visible_lines = inner.height as usize;
    detail.content_lines = lines.len();
    let max_scroll = detail.content_lines.saturating_sub(detail.visible_lines);
    detail.scroll = detail.scroll.min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(detail.scroll)
        .take(detail.visible_lines)
        .collect();
    f.render_widget(Paragraph::new(visible), inner);
}

/// Header and body, pre-wrapped so the line count is exact for scrolling.
fn article_lines(palette: &ColorPalette, article: &ArticleDetail, width: usize) -> Vec<Line<'static>> {
    let summary = &article.summary;
    let mut lines = Vec::new();

    let title = strip_control_chars(&summary.title);
    lines.extend(
        wrap_to_width(&title, width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, palette.detail_title))),
    );

    let name = strip_control_chars(&summary.author.display_name);
    let mut byline = if name.is_empty() {
        format!("@{}", summary.author.handle)
    } else {
        format!("{name} (@{})", summary.author.handle)
    };
    byline.push_str(&format!(" · {}", format_published(summary.published_at)));
    if let Some(minutes) = summary.reading_time_minutes {
        byline.push_str(&format!(" · {minutes} min read"));
    }
    lines.extend(
        wrap_to_width(&byline, width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, palette.author))),
    );

    let tags = format_tags(&summary.tags);
    if !tags.is_empty() {
        lines.push(Line::from(Span::styled(tags, palette.tags)));
    }
    lines.push(Line::from(""));

    let body = match article.body_markdown.as_deref() {
        Some(body) if !body.trim().is_empty() => body,
        _ => summary.description.as_str(),
    };
    let body = strip_control_chars(body);
    lines.extend(
        wrap_to_width(&body, width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, palette.detail_body))),
    );
    lines
}
