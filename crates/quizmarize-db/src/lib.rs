//! Quizmarize DB - Persistence layer for users, files, summaries and tasks using SQLite.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
