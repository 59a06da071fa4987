//! Keybinding registry: maps keys to actions per context, with config
//! overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// Everything a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Select,
    Back,
    HistoryBack,
    ToggleView,
    ToggleTheme,
    Reload,
    EnterSearch,
    CommitSearch,
    CancelSearch,
    OpenTags,
    ClearFilter,
    OpenAuthor,
    OpenInBrowser,
    ScrollDown,
    ScrollUp,
    ShowHelp,
    CloseOverlay,
}

impl Action {
    /// One-line description for the help overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Next article",
            Self::NavUp => "Previous article",
            Self::NavLeft => "Previous column (grid)",
            Self::NavRight => "Next column (grid)",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Top => "Jump to first article",
            Self::Bottom => "Jump to last loaded article",
            Self::Select => "Open article",
            Self::Back => "Back to articles",
            Self::HistoryBack => "Previous location",
            Self::ToggleView => "Toggle grid/list layout",
            Self::ToggleTheme => "Toggle dark/light theme",
            Self::Reload => "Reload feed from page 1",
            Self::EnterSearch => "Search titles",
            Self::CommitSearch => "Run search now",
            Self::CancelSearch => "Cancel search",
            Self::OpenTags => "Filter by tag",
            Self::ClearFilter => "Clear tag/search filter",
            Self::OpenAuthor => "Show author's articles",
            Self::OpenInBrowser => "Open in browser",
            Self::ScrollDown => "Scroll down",
            Self::ScrollUp => "Scroll up",
            Self::ShowHelp => "Show help",
            Self::CloseOverlay => "Close",
        }
    }

    /// Config name, e.g. `toggle_view`.
    pub fn config_name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::NavDown => "nav_down",
            Self::NavUp => "nav_up",
            Self::NavLeft => "nav_left",
            Self::NavRight => "nav_right",
            Self::PageDown => "page_down",
            Self::PageUp => "page_up",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Select => "select",
            Self::Back => "back",
            Self::HistoryBack => "history_back",
            Self::ToggleView => "toggle_view",
            Self::ToggleTheme => "toggle_theme",
            Self::Reload => "reload",
            Self::EnterSearch => "search",
            Self::CommitSearch => "commit_search",
            Self::CancelSearch => "cancel_search",
            Self::OpenTags => "tags",
            Self::ClearFilter => "clear_filter",
            Self::OpenAuthor => "author",
            Self::OpenInBrowser => "open",
            Self::ScrollDown => "scroll_down",
            Self::ScrollUp => "scroll_up",
            Self::ShowHelp => "help",
            Self::CloseOverlay => "close",
        }
    }

    const ALL: [Action; 26] = [
        Self::Quit,
        Self::NavDown,
        Self::NavUp,
        Self::NavLeft,
        Self::NavRight,
        Self::PageDown,
        Self::PageUp,
        Self::Top,
        Self::Bottom,
        Self::Select,
        Self::Back,
        Self::HistoryBack,
        Self::ToggleView,
        Self::ToggleTheme,
        Self::Reload,
        Self::EnterSearch,
        Self::CommitSearch,
        Self::CancelSearch,
        Self::OpenTags,
        Self::ClearFilter,
        Self::OpenAuthor,
        Self::OpenInBrowser,
        Self::ScrollDown,
        Self::ScrollUp,
        Self::ShowHelp,
        Self::CloseOverlay,
    ];

    fn from_config_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|a| a.config_name() == name)
    }
}

/// Where a key is pressed. Determines which bindings apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Feed,
    Article,
    Author,
    Search,
    TagPicker,
    Help,
}

impl Context {
    /// Text-entry and modal contexts do not see global bindings.
    fn inherits_global(self) -> bool {
        !matches!(self, Self::Search | Self::TagPicker | Self::Help)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Everywhere",
            Self::Feed => "Feed",
            Self::Article => "Article",
            Self::Author => "Author feed",
            Self::Search => "Search input",
            Self::TagPicker => "Tag picker",
            Self::Help => "Help",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Normalize terminal quirks: an uppercase char often arrives with SHIFT.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                Self::new(self.code, self.modifiers - KeyModifiers::SHIFT)
            }
            _ => self,
        }
    }
}

/// Parse a config key string: `q`, `Enter`, `Ctrl+d`, `F5`, `Space`.
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c.to_ascii_lowercase())),
            _ => None,
        };
    }

    let named = match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

fn format_key(key: &KeySpec) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{name}")
    } else {
        name
    }
}

use Action as A;
use Context as C;

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (C::Global, KeySpec::ch('q'), A::Quit),
    (C::Global, KeySpec::ctrl('c'), A::Quit),
    (C::Global, KeySpec::ch('?'), A::ShowHelp),
    (C::Global, KeySpec::ch('T'), A::ToggleTheme),
    (C::Global, KeySpec::plain(KeyCode::Backspace), A::HistoryBack),
    (C::Global, KeySpec::plain(KeyCode::Esc), A::Back),
    // Feed and author feed share navigation.
    (C::Feed, KeySpec::ch('j'), A::NavDown),
    (C::Feed, KeySpec::plain(KeyCode::Down), A::NavDown),
    (C::Feed, KeySpec::ch('k'), A::NavUp),
    (C::Feed, KeySpec::plain(KeyCode::Up), A::NavUp),
    (C::Feed, KeySpec::ch('h'), A::NavLeft),
    (C::Feed, KeySpec::plain(KeyCode::Left), A::NavLeft),
    (C::Feed, KeySpec::ch('l'), A::NavRight),
    (C::Feed, KeySpec::plain(KeyCode::Right), A::NavRight),
    (C::Feed, KeySpec::plain(KeyCode::PageDown), A::PageDown),
    (C::Feed, KeySpec::ctrl('d'), A::PageDown),
    (C::Feed, KeySpec::plain(KeyCode::PageUp), A::PageUp),
    (C::Feed, KeySpec::ctrl('u'), A::PageUp),
    (C::Feed, KeySpec::ch('g'), A::Top),
    (C::Feed, KeySpec::ch('G'), A::Bottom),
    (C::Feed, KeySpec::plain(KeyCode::Enter), A::Select),
    (C::Feed, KeySpec::ch('v'), A::ToggleView),
    (C::Feed, KeySpec::ch('r'), A::Reload),
    (C::Feed, KeySpec::ch('/'), A::EnterSearch),
    (C::Feed, KeySpec::ch('t'), A::OpenTags),
    (C::Feed, KeySpec::ch('c'), A::ClearFilter),
    (C::Feed, KeySpec::ch('a'), A::OpenAuthor),
    (C::Feed, KeySpec::ch('o'), A::OpenInBrowser),
    (C::Author, KeySpec::ch('j'), A::NavDown),
    (C::Author, KeySpec::plain(KeyCode::Down), A::NavDown),
    (C::Author, KeySpec::ch('k'), A::NavUp),
    (C::Author, KeySpec::plain(KeyCode::Up), A::NavUp),
    (C::Author, KeySpec::ch('h'), A::NavLeft),
    (C::Author, KeySpec::plain(KeyCode::Left), A::NavLeft),
    (C::Author, KeySpec::ch('l'), A::NavRight),
    (C::Author, KeySpec::plain(KeyCode::Right), A::NavRight),
    (C::Author, KeySpec::plain(KeyCode::PageDown), A::PageDown),
    (C::Author, KeySpec::plain(KeyCode::PageUp), A::PageUp),
    (C::Author, KeySpec::ch('g'), A::Top),
    (C::Author, KeySpec::ch('G'), A::Bottom),
    (C::Author, KeySpec::plain(KeyCode::Enter), A::Select),
    (C::Author, KeySpec::ch('v'), A::ToggleView),
    (C::Author, KeySpec::ch('r'), A::Reload),
    (C::Author, KeySpec::ch('o'), A::OpenInBrowser),
    (C::Article, KeySpec::ch('j'), A::ScrollDown),
    (C::Article, KeySpec::plain(KeyCode::Down), A::ScrollDown),
    (C::Article, KeySpec::ch('k'), A::ScrollUp),
    (C::Article, KeySpec::plain(KeyCode::Up), A::ScrollUp),
    (C::Article, KeySpec::plain(KeyCode::PageDown), A::PageDown),
    (C::Article, KeySpec::ctrl('d'), A::PageDown),
    (C::Article, KeySpec::ch(' '), A::PageDown),
    (C::Article, KeySpec::plain(KeyCode::PageUp), A::PageUp),
    (C::Article, KeySpec::ctrl('u'), A::PageUp),
    (C::Article, KeySpec::ch('o'), A::OpenInBrowser),
    (C::Article, KeySpec::ch('a'), A::OpenAuthor),
    (C::Search, KeySpec::plain(KeyCode::Enter), A::CommitSearch),
    (C::Search, KeySpec::plain(KeyCode::Esc), A::CancelSearch),
    (C::TagPicker, KeySpec::ch('j'), A::NavDown),
    (C::TagPicker, KeySpec::plain(KeyCode::Down), A::NavDown),
    (C::TagPicker, KeySpec::ch('k'), A::NavUp),
    (C::TagPicker, KeySpec::plain(KeyCode::Up), A::NavUp),
    (C::TagPicker, KeySpec::plain(KeyCode::Enter), A::Select),
    (C::TagPicker, KeySpec::plain(KeyCode::Esc), A::CloseOverlay),
    (C::TagPicker, KeySpec::ch('q'), A::CloseOverlay),
    (C::Help, KeySpec::ch('j'), A::NavDown),
    (C::Help, KeySpec::plain(KeyCode::Down), A::NavDown),
    (C::Help, KeySpec::ch('k'), A::NavUp),
    (C::Help, KeySpec::plain(KeyCode::Up), A::NavUp),
    (C::Help, KeySpec::plain(KeyCode::Esc), A::CloseOverlay),
    (C::Help, KeySpec::ch('?'), A::CloseOverlay),
    (C::Help, KeySpec::ch('q'), A::CloseOverlay),
];

/// Context-aware key lookup.
///
/// A key bound in the current context wins; otherwise the global binding
/// applies, except in overlay and text-entry contexts.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply `action = "key"` overrides from config.
    ///
    /// The new key replaces every default key for that action, in every
    /// context the action was bound in. Returns warnings for unknown actions
    /// and unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut names: Vec<&String> = overrides.keys().collect();
        names.sort();

        for action_name in names {
            let key_str = &overrides[action_name];
            let Some(action) = Action::from_config_name(action_name) else {
                warnings.push(format!("Unknown action '{action_name}', ignoring"));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{key_str}' for action '{action_name}', ignoring"
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        if context != Context::Global && context.inherits_global() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }

    /// `(context, key label, description)` rows for the help overlay, with
    /// keys for the same action in the same context joined.
    pub fn help_rows(&self) -> Vec<(Context, String, &'static str)> {
        let mut rows: Vec<(Context, Action, Vec<String>)> = Vec::new();
        for (context, key, action) in &self.bindings {
            match rows
                .iter_mut()
                .find(|(c, a, _)| c == context && a == action)
            {
                Some((_, _, keys)) => keys.push(format_key(key)),
                None => rows.push((*context, *action, vec![format_key(key)])),
            }
        }
        rows.into_iter()
            .map(|(context, action, keys)| (context, keys.join("/"), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
