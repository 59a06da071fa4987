//! Locations and navigation history.
//!
//! A [`Location`] is the URL-shaped state that survives navigation: which
//! screen is showing plus the `pos`, `view`, `tag` and `query` parameters.
//! It parses from and formats to `/path?params` strings, so it can come from
//! the command line and be persisted as a single preference value.

use crate::feed::{FilterContext, ViewMode};
use std::fmt;
use thiserror::Error;
use url::{form_urlencoded, Url};

/// Entries kept before the oldest are dropped.
const MAX_HISTORY: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Invalid location '{0}'")]
    Invalid(String),
    #[error("Unknown route '{0}'")]
    UnknownRoute(String),
    #[error("Invalid article id '{0}'")]
    InvalidArticleId(String),
    #[error("Invalid author handle '{0}'")]
    InvalidHandle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// `/`
    #[default]
    Feed,
    /// `/blog/{id}`
    Article(u64),
    /// `/author/{handle}`
    Author(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    route: Route,
    pos: Option<usize>,
    view: ViewMode,
    filter: FilterContext,
}

impl Location {
    pub fn feed() -> Self {
        Self::default()
    }

    pub fn article(id: u64) -> Self {
        Self {
            route: Route::Article(id),
            ..Self::default()
        }
    }

    pub fn author(handle: impl Into<String>) -> Self {
        Self {
            route: Route::Author(handle.into()),
            ..Self::default()
        }
    }

    /// Parse `/path?params`, or a full URL whose path and query are used.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let input = input.trim();
        let base = Url::parse("http://devfeed.invalid/")
            .map_err(|e| LocationError::Invalid(e.to_string()))?;
        let url = base
            .join(input)
            .map_err(|_| LocationError::Invalid(input.to_string()))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let route = match segments.as_slice() {
            [] => Route::Feed,
            ["blog", id] => Route::Article(
                id.parse()
                    .map_err(|_| LocationError::InvalidArticleId(id.to_string()))?,
            ),
            ["author", handle] => {
                if !is_valid_handle(handle) {
                    return Err(LocationError::InvalidHandle(handle.to_string()));
                }
                Route::Author(handle.to_string())
            }
            _ => return Err(LocationError::UnknownRoute(url.path().to_string())),
        };

        let mut pos = None;
        let mut view = None;
        let mut tag = None;
        let mut query = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "pos" => match value.parse::<usize>() {
                    Ok(p) => pos = Some(p),
                    Err(_) => tracing::warn!(value = %value, "Ignoring invalid pos parameter"),
                },
                "view" => view = Some(value.into_owned()),
                "tag" => tag = Some(value.into_owned()),
                "query" => query = Some(value.into_owned()),
                other => tracing::debug!(param = other, "Ignoring unknown location parameter"),
            }
        }

        Ok(Self {
            route,
            pos,
            view: ViewMode::from_param(view.as_deref()),
            filter: FilterContext::from_parts(tag.as_deref(), query.as_deref()),
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn pos(&self) -> Option<usize> {
        self.pos
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }

    pub fn with_pos(mut self, pos: Option<usize>) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_view(mut self, view: ViewMode) -> Self {
        self.view = view;
        self
    }

    pub fn with_filter(mut self, filter: FilterContext) -> Self {
        self.filter = filter;
        self
    }

    /// Same location with the one-shot scroll token removed.
    pub fn without_pos(&self) -> Self {
        self.clone().with_pos(None)
    }

    /// `route` carrying this location's feed parameters.
    ///
    /// Used when leaving the feed so `pos`, `view`, `tag` and `query` ride
    /// along and can be handed back on return.
    pub fn carry_to(&self, route: Route) -> Self {
        Self {
            route,
            ..self.clone()
        }
    }

    /// The feed this location was reached from, with its parameters intact.
    pub fn back_to_feed(&self) -> Self {
        self.carry_to(Route::Feed)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.route {
            Route::Feed => write!(f, "/")?,
            Route::Article(id) => write!(f, "/blog/{id}")?,
            Route::Author(handle) => write!(f, "/author/{handle}")?,
        }

        let mut params = form_urlencoded::Serializer::new(String::new());
        if let Some(tag) = self.filter.tag_value() {
            params.append_pair("tag", tag);
        }
        if let Some(query) = self.filter.query_value() {
            params.append_pair("query", query);
        }
        if let Some(view) = self.view.as_param() {
            params.append_pair("view", view);
        }
        if let Some(pos) = self.pos {
            params.append_pair("pos", &pos.to_string());
        }
        let params = params.finish();
        if !params.is_empty() {
            write!(f, "?{params}")?;
        }
        Ok(())
    }
}

fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= 64
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// In-memory back stack. Mirrors browser semantics minus forward navigation.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    pub fn current(&self) -> &Location {
        // `entries` is never empty: `new` seeds it and `back` keeps the last.
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn push(&mut self, location: Location) {
        tracing::debug!(location = %location, "history push");
        self.entries.push(location);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
    }

    /// Overwrite the current entry without adding history.
    pub fn replace(&mut self, location: Location) {
        tracing::debug!(location = %location, "history replace");
        let last = self.entries.len() - 1;
        self.entries[last] = location;
    }

    /// The entry [`back`](Self::back) would land on.
    pub fn previous(&self) -> Option<&Location> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    /// Pop the current entry. `None` at the root.
    pub fn back(&mut self) -> Option<&Location> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.pop();
        Some(self.current())
    }
}
