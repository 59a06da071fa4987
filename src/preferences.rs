//! Preference manager that layers stored preferences over config.toml.
//!
//! Config values are the defaults; rows in `user_preferences` override them.
//! Writes always go to the database, never to the config file.
use std::collections::HashMap;

use crate::config::Config;
use crate::nav::{Location, Route};
use crate::storage::{Database, DatabaseError};

pub const THEME_KEY: &str = "theme";
pub const SESSION_LOCATION_KEY: &str = "session.location";

/// Merged preference view. Reads are in-memory; writes persist first and
/// then update the map.
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
    restore_session: bool,
}

impl PreferenceManager {
    pub async fn load(config: &Config, db: &Database) -> Result<Self, DatabaseError> {
        let mut manager = Self::from_config(config);
        for (key, value) in db.all_preferences().await? {
            manager.prefs.insert(key, value);
        }
        Ok(manager)
    }

    /// Config only. Used when the database cannot be opened.
    pub fn from_config(config: &Config) -> Self {
        let mut prefs = HashMap::new();
        prefs.insert(THEME_KEY.to_string(), config.theme.clone());
        Self {
            prefs,
            restore_session: config.restore_session,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    pub async fn set(&mut self, db: &Database, key: &str, value: &str) -> Result<(), DatabaseError> {
        db.set_preference(key, value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn theme_variant(&self) -> &str {
        self.get(THEME_KEY).unwrap_or("dark")
    }

    /// Location to reopen on start, if restoring is enabled and a valid one
    /// was saved. Corrupt values are logged and ignored.
    pub fn session_location(&self) -> Option<Location> {
        if !self.restore_session {
            return None;
        }
        let raw = self.get(SESSION_LOCATION_KEY)?;
        match Location::parse(raw) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "Ignoring invalid saved location");
                None
            }
        }
    }

    /// Persist `location` for the next start. The scroll token is dropped and
    /// only feed or author locations are kept; a detail view saves the feed
    /// it was opened from.
    pub async fn save_session(
        &mut self,
        db: &Database,
        location: &Location,
    ) -> Result<(), DatabaseError> {
        if !self.restore_session {
            return Ok(());
        }
        let location = match location.route() {
            Route::Article(_) => location.back_to_feed(),
            _ => location.clone(),
        };
        let value = location.without_pos().to_string();
        self.set(db, SESSION_LOCATION_KEY, &value).await
    }
}
