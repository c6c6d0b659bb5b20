//! Database migrations and schema management.

use crate::error::DbResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database from version {} to {}",
            current_version, SCHEMA_VERSION
        );
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Identities (credentials live with the token issuer)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        -- Uploaded documents
        CREATE TABLE IF NOT EXISTS files (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            filename TEXT NOT NULL,
            object_key TEXT NOT NULL,
            content_type TEXT NOT NULL,
            uploaded_at TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'uploaded'
                CHECK (status IN ('uploaded', 'processing', 'completed', 'failed')),
            content TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_files_owner ON files(owner_id, uploaded_at DESC);

        -- One summary per file
        CREATE TABLE IF NOT EXISTS summaries (
            id TEXT PRIMARY KEY,
            file_id TEXT NOT NULL UNIQUE REFERENCES files(id) ON DELETE CASCADE,
            summary_text TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        -- Generated quiz tasks
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            summary_id TEXT NOT NULL REFERENCES summaries(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            task_type TEXT NOT NULL
                CHECK (task_type IN ('multiple_choice', 'open_question', 'matching')),
            task_data TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_summary ON tasks(summary_id, position);
        "#,
    )?;

    Ok(())
}
