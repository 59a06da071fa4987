use std::fmt;

/// What narrows the feed. Tag and query are mutually exclusive: setting one
/// replaces the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterContext {
    #[default]
    None,
    Tag(String),
    Query(String),
}

impl FilterContext {
    /// Tag filter; blank input clears the filter.
    pub fn tag(tag: impl AsRef<str>) -> Self {
        match normalize(tag.as_ref()) {
            Some(tag) => Self::Tag(tag),
            None => Self::None,
        }
    }

    /// Free-text filter; blank input clears the filter.
    pub fn query(query: impl AsRef<str>) -> Self {
        match normalize(query.as_ref()) {
            Some(query) => Self::Query(query),
            None => Self::None,
        }
    }

    /// Combine optional tag and query parameters (e.g. from a URL).
    ///
    /// When both are present the query wins.
    pub fn from_parts(tag: Option<&str>, query: Option<&str>) -> Self {
        match query.and_then(normalize) {
            Some(query) => Self::Query(query),
            None => tag.map(Self::tag).unwrap_or_default(),
        }
    }

    pub fn tag_value(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn query_value(&self) -> Option<&str> {
        match self {
            Self::Query(query) => Some(query),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Fetch dispatch for this context on the main feed.
    pub fn scope(&self) -> FeedScope {
        match self {
            Self::None => FeedScope::Latest,
            Self::Tag(tag) => FeedScope::Tag(tag.clone()),
            Self::Query(query) => FeedScope::Search(query.clone()),
        }
    }
}

impl fmt::Display for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "latest"),
            Self::Tag(tag) => write!(f, "#{tag}"),
            Self::Query(query) => write!(f, "\"{query}\""),
        }
    }
}

/// Which listing endpoint a feed paginates over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedScope {
    #[default]
    Latest,
    Tag(String),
    /// Bounded title search; always a one-shot result.
    Search(String),
    Author(String),
}

impl FeedScope {
    /// Search scope never paginates past its bounded scan.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    /// Short label for logs and the status bar.
    pub fn label(&self) -> String {
        match self {
            Self::Latest => "latest".to_string(),
            Self::Tag(tag) => format!("#{tag}"),
            Self::Search(query) => format!("search \"{query}\""),
            Self::Author(handle) => format!("@{handle}"),
        }
    }
}

/// Layout of the feed. Presentation only, never touches feed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }

    /// URL form: `list`, or nothing for the default grid.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Grid => None,
            Self::List => Some("list"),
        }
    }

    /// Anything other than `list` means grid.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("list") => Self::List,
            _ => Self::Grid,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::List => "List",
        }
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
