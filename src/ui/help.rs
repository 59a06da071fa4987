//! Help overlay: scrollable keybinding table.
//!
//! Built from the live registry, so config overrides show up here.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::render::centered_rect;

/// Sections in display order.
const CONTEXT_ORDER: [Context; 7] = [
    Context::Global,
    Context::Feed,
    Context::Author,
    Context::Article,
    Context::Search,
    Context::TagPicker,
    Context::Help,
];

pub(super) fn render(f: &mut Frame, app: &App, scroll: usize) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let palette = &app.palette;
    let bindings = app.keybindings.help_rows();
    let mut rows: Vec<Row> = Vec::new();

    for ctx in CONTEXT_ORDER {
        let mut section = bindings.iter().filter(|(c, _, _)| *c == ctx).peekable();
        if section.peek().is_none() {
            continue;
        }
        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", ctx.label()),
                palette.detail_title,
            )),
            Line::from(""),
        ]));
        for (_, keys, description) in section {
            rows.push(Row::new(vec![
                Line::from(Span::styled(format!("  {keys}"), palette.help_key)),
                Line::from(*description),
            ]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let total_rows = rows.len();
    let visible_height = overlay.height.saturating_sub(4) as usize;
    let max_scroll = total_rows.saturating_sub(visible_height);
    let scroll = scroll.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(visible_rows, [Constraint::Length(22), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.overlay_border)
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(palette.detail_body);
    f.render_widget(table, overlay);

    if scroll < max_scroll {
        let hint = Line::from(Span::styled(
            " j/k to scroll, ? or Esc to close ",
            palette.meta,
        ));
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}
