//! History data models.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Format SQLite writes into the `timestamp` column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One stored conversational turn (user input or bot reply).
///
/// Records are immutable once written. `id` and `created_at` are assigned by
/// the store; `id` breaks ties between records sharing a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    /// Insert time as written by SQLite, UTC, millisecond precision.
    pub created_at: String,
}

impl MessageRecord {
    /// Parse `created_at` into a UTC timestamp.
    ///
    /// Returns `None` if the column holds something SQLite did not write itself.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}
