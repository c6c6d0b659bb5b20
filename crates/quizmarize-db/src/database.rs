//! SQLite connection pool.

use crate::error::{DbError, DbResult};
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Connections kept per database. Requests hold one only for the length
/// of a single operation.
const POOL_SIZE: u32 = 8;

/// Distinguishes in-memory databases opened by the same process.
static MEMORY_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Handle to the users, files, summaries and tasks tables.
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (or create) the database file, creating its directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Other(e.to_string()))?;
        }

        info!("Opening database at: {}", path.display());
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        Self::from_manager(manager)
    }

    /// Open a private in-memory database.
    ///
    /// Every pooled connection attaches to the same shared-cache database,
    /// which lives until the last connection closes.
    pub fn open_in_memory() -> DbResult<Self> {
        let uri = format!(
            "file:quizmarize-mem-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            MEMORY_DB_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let manager = SqliteConnectionManager::file(uri)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )
            });
        Self::from_manager(manager)
    }

    fn from_manager(manager: SqliteConnectionManager) -> DbResult<Self> {
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .min_idle(Some(1))
            .build(manager)?;

        migrations::initialize_schema(&*pool.get()?)?;
        Ok(Self { pool })
    }

    /// Borrow a connection from the pool.
    pub fn conn(&self) -> DbResult<PooledConn> {
        self.pool.get().map_err(DbError::from)
    }
}
