use thiserror::Error;

/// Database errors with user-facing messages.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds the database lock.
    #[error("Another instance of devfeed appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Unknown preference key '{0}'")]
    UnknownPreference(String),

    #[error("Preference '{key}' is too large ({len} bytes, max {max})")]
    ValueTooLarge { key: String, len: usize, max: usize },

    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, mapping SQLite lock failures to `InstanceLocked`.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY, SQLITE_LOCKED and SQLITE_CANTOPEN, by message.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_messages_detected() {
        assert!(is_lock_message("error returned from database: database is locked"));
        assert!(is_lock_message("(code: 14) unable to open database file"));
        assert!(!is_lock_message("no such table: user_preferences"));
    }

    #[test]
    fn test_value_too_large_message() {
        let err = DatabaseError::ValueTooLarge {
            key: "session.location".to_string(),
            len: 5000,
            max: 4096,
        };
        assert_eq!(
            err.to_string(),
            "Preference 'session.location' is too large (5000 bytes, max 4096)"
        );
    }
}
