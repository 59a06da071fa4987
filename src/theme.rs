//! Theme system for the TUI.
//!
//! Semantic color roles mapped to ratatui `Style` values. `ThemeVariant`
//! selects between the dark and light palettes; `T` toggles at runtime and
//! the choice is stored as the `theme` preference.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Case-insensitive variant name.
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Stored preference value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Every styled element of the UI.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Header --
    pub header: Style,
    pub header_filter: Style,

    // -- Grid cards --
    pub card_border: Style,
    pub card_border_selected: Style,
    pub card_title: Style,
    pub card_description: Style,

    // -- List rows --
    pub list_row: Style,
    pub list_selected: Style,

    // -- Shared article metadata --
    pub meta: Style,
    pub tags: Style,
    pub author: Style,

    // -- Detail view --
    pub detail_title: Style,
    pub detail_body: Style,
    pub detail_error: Style,

    // -- Overlays --
    pub overlay_border: Style,
    pub overlay_selected: Style,
    pub input: Style,
    pub help_key: Style,

    // -- Status bar --
    pub status_bar: Style,
    pub status_loading: Style,
    pub status_error: Style,
    pub status_end: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            header_filter: Style::default().fg(Color::Cyan),

            card_border: Style::default().fg(Color::DarkGray),
            card_border_selected: Style::default().fg(Color::Cyan),
            card_title: Style::default().add_modifier(Modifier::BOLD),
            card_description: Style::default().fg(Color::Gray),

            list_row: Style::default(),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),

            meta: Style::default().fg(Color::DarkGray),
            tags: Style::default().fg(Color::Cyan),
            author: Style::default().fg(Color::Yellow),

            detail_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_error: Style::default().fg(Color::Red),

            overlay_border: Style::default().fg(Color::Yellow),
            overlay_selected: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            input: Style::default().fg(Color::White),
            help_key: Style::default().fg(Color::Yellow),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_loading: Style::default().bg(Color::DarkGray).fg(Color::Cyan),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            status_end: Style::default().bg(Color::DarkGray).fg(Color::Gray),
        }
    }

    fn light() -> Self {
        Self {
            header: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            header_filter: Style::default().fg(Color::Blue),

            card_border: Style::default().fg(Color::Gray),
            card_border_selected: Style::default().fg(Color::Blue),
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_description: Style::default().fg(Color::DarkGray),

            list_row: Style::default().fg(Color::Black),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),

            meta: Style::default().fg(Color::DarkGray),
            tags: Style::default().fg(Color::Blue),
            author: Style::default().fg(Color::Magenta),

            detail_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_error: Style::default().fg(Color::Red),

            overlay_border: Style::default().fg(Color::Magenta),
            overlay_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            input: Style::default().fg(Color::Black),
            help_key: Style::default().fg(Color::Magenta),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_loading: Style::default().bg(Color::White).fg(Color::Blue),
            status_error: Style::default().bg(Color::White).fg(Color::Red),
            status_end: Style::default().bg(Color::White).fg(Color::DarkGray),
        }
    }
}
