//! File record operations.

use super::parse_timestamp;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use quizmarize_core::{File, FileDetail, FileStatus};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

const FILE_COLUMNS: &str =
    "id, owner_id, filename, object_key, content_type, uploaded_at, status, content";

impl Database {
    /// Create a new file record.
    pub fn create_file(&self, file: &File) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO files (id, owner_id, filename, object_key, content_type, uploaded_at, status, content)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                file.id,
                file.owner_id,
                file.filename,
                file.object_key,
                file.content_type,
                file.uploaded_at.to_rfc3339(),
                file.status.as_str(),
                file.content,
            ],
        )?;
        debug!("Created file record {} ({})", file.id, file.filename);
        Ok(())
    }

    /// Get a file by ID.
    pub fn get_file(&self, id: &str) -> DbResult<File> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM files WHERE id = ?1", FILE_COLUMNS),
            params![id],
            row_to_file,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("File not found: {}", id)),
            _ => DbError::from(e),
        })
    }

    /// List a user's files, newest first.
    pub fn list_files_for_owner(&self, owner_id: &str) -> DbResult<Vec<File>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM files WHERE owner_id = ?1 ORDER BY uploaded_at DESC",
            FILE_COLUMNS
        ))?;
        let files = stmt.query_map(params![owner_id], row_to_file)?;
        files.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Get a file with its summary and the summary's tasks.
    pub fn get_file_detail(&self, id: &str) -> DbResult<FileDetail> {
        let file = self.get_file(id)?;
        let summary = self.get_summary_for_file(id)?;
        Ok(FileDetail { file, summary })
    }

    /// `uploaded -> processing`.
    pub fn mark_file_processing(&self, id: &str) -> DbResult<()> {
        self.transition_file(id, FileStatus::Processing, None)
    }

    /// `processing -> completed`, storing the extracted text.
    pub fn mark_file_completed(&self, id: &str, content: &str) -> DbResult<()> {
        self.transition_file(id, FileStatus::Completed, Some(content))
    }

    /// `processing -> failed`.
    pub fn mark_file_failed(&self, id: &str) -> DbResult<()> {
        self.transition_file(id, FileStatus::Failed, None)
    }

    /// Apply a forward status step as one guarded statement.
    ///
    /// The row only changes if it still holds the predecessor status, so a
    /// concurrent writer can never move a file backwards.
    fn transition_file(&self, id: &str, next: FileStatus, content: Option<&str>) -> DbResult<()> {
        let expected = next.predecessor().ok_or_else(|| DbError::InvalidTransition {
            id: id.to_string(),
            expected: "none".to_string(),
            found: next.to_string(),
        })?;

        let conn = self.conn()?;
        let rows = match content {
            Some(text) => conn.execute(
                "UPDATE files SET status = ?2, content = ?3 WHERE id = ?1 AND status = ?4",
                params![id, next.as_str(), text, expected.as_str()],
            )?,
            None => conn.execute(
                "UPDATE files SET status = ?2 WHERE id = ?1 AND status = ?3",
                params![id, next.as_str(), expected.as_str()],
            )?,
        };

        if rows == 0 {
            let found: Option<String> = conn
                .query_row("SELECT status FROM files WHERE id = ?1", params![id], |row| row.get(0))
                .optional()?;
            return Err(match found {
                None => DbError::NotFound(format!("File not found: {}", id)),
                Some(found) => DbError::InvalidTransition {
                    id: id.to_string(),
                    expected: expected.to_string(),
                    found,
                },
            });
        }

        info!("File {} is now {}", id, next);
        Ok(())
    }
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<File> {
    let uploaded_at: String = row.get(5)?;
    let status: String = row.get(6)?;

    Ok(File {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        filename: row.get(2)?,
        object_key: row.get(3)?,
        content_type: row.get(4)?,
        uploaded_at: parse_timestamp(&uploaded_at),
        status: FileStatus::from_str(&status).unwrap_or(FileStatus::Failed),
        content: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmarize_core::User;

    fn setup() -> (Database, User) {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("owner@example.com");
        db.create_user(&user).unwrap();
        (db, user)
    }

    fn new_file(owner: &User, name: &str) -> File {
        File::new(&owner.id, name, format!("user_{}/{}", owner.id, name), "application/pdf")
    }

    #[test]
    fn test_file_crud() {
        let (db, user) = setup();
        let file = new_file(&user, "notes.pdf");
        db.create_file(&file).unwrap();

        let fetched = db.get_file(&file.id).unwrap();
        assert_eq!(fetched.filename, "notes.pdf");
        assert_eq!(fetched.status, FileStatus::Uploaded);
        assert!(fetched.content.is_none());

        assert!(matches!(db.get_file("nope"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_forward_transitions() {
        let (db, user) = setup();
        let file = new_file(&user, "notes.pdf");
        db.create_file(&file).unwrap();

        db.mark_file_processing(&file.id).unwrap();
        assert_eq!(db.get_file(&file.id).unwrap().status, FileStatus::Processing);

        db.mark_file_completed(&file.id, "extracted").unwrap();
        let done = db.get_file(&file.id).unwrap();
        assert_eq!(done.status, FileStatus::Completed);
        assert_eq!(done.content.as_deref(), Some("extracted"));
    }

    #[test]
    fn test_terminal_status_never_reverts() {
        let (db, user) = setup();
        let file = new_file(&user, "notes.pdf");
        db.create_file(&file).unwrap();
        db.mark_file_processing(&file.id).unwrap();
        db.mark_file_failed(&file.id).unwrap();

        let err = db.mark_file_completed(&file.id, "late").unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition { .. }));
        assert!(db.mark_file_processing(&file.id).is_err());

        let stored = db.get_file(&file.id).unwrap();
        assert_eq!(stored.status, FileStatus::Failed);
        assert!(stored.content.is_none());
    }

    #[test]
    fn test_cannot_skip_processing() {
        let (db, user) = setup();
        let file = new_file(&user, "notes.pdf");
        db.create_file(&file).unwrap();

        assert!(db.mark_file_completed(&file.id, "x").is_err());
        assert_eq!(db.get_file(&file.id).unwrap().status, FileStatus::Uploaded);
    }

    #[test]
    fn test_transition_on_missing_file() {
        let (db, _) = setup();
        assert!(matches!(db.mark_file_processing("ghost"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_files_for_owner() {
        use chrono::Duration;

        let (db, alice) = setup();
        let bob = User::new("bob@example.com");
        db.create_user(&bob).unwrap();

        let mut older = new_file(&alice, "old.pdf");
        older.uploaded_at = older.uploaded_at - Duration::hours(1);
        let newer = new_file(&alice, "new.pdf");
        db.create_file(&older).unwrap();
        db.create_file(&newer).unwrap();
        db.create_file(&new_file(&bob, "bob.pdf")).unwrap();

        let files = db.list_files_for_owner(&alice.id).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["new.pdf", "old.pdf"]);
    }

    #[test]
    fn test_detail_without_summary() {
        let (db, user) = setup();
        let file = new_file(&user, "notes.pdf");
        db.create_file(&file).unwrap();

        let detail = db.get_file_detail(&file.id).unwrap();
        assert_eq!(detail.file.id, file.id);
        assert!(detail.summary.is_none());
    }
}
