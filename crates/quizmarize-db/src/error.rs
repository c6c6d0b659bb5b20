//! Database error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition for file {id}: expected {expected}, found {found}")]
    InvalidTransition {
        id: String,
        expected: String,
        found: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Other(String),
}

pub type DbResult<T> = Result<T, DbError>;
