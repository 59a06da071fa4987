//! SQLite persistence for user preferences.
//!
//! The article feed itself is never stored: it is re-fetched on every visit.
//! Only small key/value preferences (theme, last location) survive restarts.

mod preferences;
mod schema;
mod types;

pub use preferences::{is_known_preference, MAX_PREFERENCE_VALUE_LEN, PREFERENCE_KEYS};
pub use schema::Database;
pub use types::DatabaseError;
