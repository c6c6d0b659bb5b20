//! Database CRUD operations.

pub mod files;
pub mod summaries;
pub mod users;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 column, falling back to now for corrupt rows.
pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
