use std::borrow::Cow;

use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Terminal columns `s` occupies (CJK and emoji count as two).
///
/// ```
/// use devfeed::util::display_width;
///
/// assert_eq!(display_width("rust"), 4);
/// assert_eq!(display_width("日本"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Fit `s` into `max_width` columns, ending in `...` when cut.
///
/// Widths of three or less have no room for the ellipsis, so the text is
/// simply clipped. Returns the input borrowed when it already fits.
///
/// ```
/// use devfeed::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Understanding lifetimes", 12), "Understan...");
/// assert_eq!(truncate_to_width("short", 12), "short");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS.len() {
        return Cow::Owned(take_columns(s, max_width).to_string());
    }
    let head = take_columns(s, max_width - ELLIPSIS.len());
    Cow::Owned(format!("{head}{ELLIPSIS}"))
}

/// Longest prefix of `s` that fits in `columns`.
fn take_columns(s: &str, columns: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > columns {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Remove terminal control sequences from API-provided text.
///
/// Titles, descriptions and bodies come from third parties and are written
/// straight into the terminal, so ESC-introduced sequences (CSI and OSC) and
/// other C0 controls are dropped. Tab and newline survive; CR is dropped.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let dirty = s
        .chars()
        .any(|c| c == '\u{1b}' || c == '\u{7f}' || c == '\r' || (c.is_control() && c != '\t' && c != '\n'));
    if !dirty {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI runs until a final byte in 0x40..=0x7e.
                    for n in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&n) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    // OSC runs until BEL or ST (ESC \).
                    while let Some(n) = chars.next() {
                        if n == '\u{07}' {
                            break;
                        }
                        if n == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Greedy word wrap into lines of at most `width` columns.
///
/// Existing newlines are kept as paragraph breaks. Words wider than `width`
/// are hard-split.
pub fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word = word;
            let mut word_width = display_width(word);

            if line_width > 0 && line_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            while word_width > width {
                let head = take_columns(word, width);
                let head = if head.is_empty() {
                    // A single glyph wider than the line; emit it anyway.
                    let end = word.chars().next().map_or(word.len(), char::len_utf8);
                    &word[..end]
                } else {
                    head
                };
                if line_width > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                lines.push(head.to_string());
                word = &word[head.len()..];
                word_width = display_width(word);
            }

            if word.is_empty() {
                continue;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += word_width;
        }

        lines.push(line);
    }

    lines
}

/// `Mar 4, 2024`, or `undated`.
pub fn format_published(published_at: Option<DateTime<Utc>>) -> String {
    match published_at {
        Some(at) => at.format("%b %-d, %Y").to_string(),
        None => "undated".to_string(),
    }
}

/// `#rust #async`, skipping blank tags.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}
