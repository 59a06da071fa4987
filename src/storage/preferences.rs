use super::schema::Database;
use super::types::DatabaseError;

/// Keys the preference table accepts.
pub const PREFERENCE_KEYS: &[&str] = &["theme", "session.location"];

/// Upper bound on a stored value, in bytes.
pub const MAX_PREFERENCE_VALUE_LEN: usize = 4096;

pub fn is_known_preference(key: &str) -> bool {
    PREFERENCE_KEYS.contains(&key)
}

impl Database {
    /// Stored value for `key`, if any.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Insert or update a preference.
    ///
    /// Rejects keys outside [`PREFERENCE_KEYS`] and values longer than
    /// [`MAX_PREFERENCE_VALUE_LEN`].
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        if !is_known_preference(key) {
            return Err(DatabaseError::UnknownPreference(key.to_string()));
        }
        if value.len() > MAX_PREFERENCE_VALUE_LEN {
            return Err(DatabaseError::ValueTooLarge {
                key: key.to_string(),
                len: value.len(),
                max: MAX_PREFERENCE_VALUE_LEN,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!(key, "Saved preference");
        Ok(())
    }

    pub async fn delete_preference(&self, key: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Every stored preference with a whitelisted key, ordered by key.
    ///
    /// Rows with unknown keys (e.g. written by an older version) are skipped.
    pub async fn all_preferences(&self) -> Result<Vec<(String, String)>, DatabaseError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM user_preferences ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .filter(|(key, _)| {
                let known = is_known_preference(key);
                if !known {
                    tracing::debug!(key = %key, "Skipping unknown stored preference");
                }
                known
            })
            .collect())
    }
}
