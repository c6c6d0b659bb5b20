//! Summary and task operations.

use super::parse_timestamp;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use quizmarize_core::{FileStatus, Summary, Task, TaskData, TaskType};
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

impl Database {
    /// Store a summary and its tasks in one transaction.
    ///
    /// The file must be `completed` and must not have a summary yet.
    pub fn create_summary(&self, summary: &Summary) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM files WHERE id = ?1",
                params![summary.file_id],
                |row| row.get(0),
            )
            .optional()?;

        match status.as_deref().and_then(FileStatus::from_str) {
            None => return Err(DbError::NotFound(format!("File not found: {}", summary.file_id))),
            Some(FileStatus::Completed) => {}
            Some(other) => {
                return Err(DbError::Conflict(format!(
                    "File {} is {}, summaries need a completed file",
                    summary.file_id, other
                )))
            }
        }

        tx.execute(
            "INSERT INTO summaries (id, file_id, summary_text, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                summary.id,
                summary.file_id,
                summary.summary_text,
                summary.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Conflict(format!("File {} already has a summary", summary.file_id))
            }
            _ => DbError::from(e),
        })?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, summary_id, position, task_type, task_data) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, task) in summary.tasks.iter().enumerate() {
                let payload = task
                    .data
                    .payload()
                    .map_err(|e| DbError::Other(e.to_string()))?;
                stmt.execute(params![
                    task.id,
                    summary.id,
                    position as i64,
                    task.task_type().as_str(),
                    payload.to_string(),
                ])?;
            }
        }

        tx.commit()?;
        info!(
            "Stored summary {} with {} tasks for file {}",
            summary.id,
            summary.tasks.len(),
            summary.file_id
        );
        Ok(())
    }

    /// Get the summary of a file, with tasks in generation order.
    pub fn get_summary_for_file(&self, file_id: &str) -> DbResult<Option<Summary>> {
        let conn = self.conn()?;
        let summary = conn
            .query_row(
                "SELECT id, file_id, summary_text, created_at FROM summaries WHERE file_id = ?1",
                params![file_id],
                |row| {
                    let created_at: String = row.get(3)?;
                    Ok(Summary {
                        id: row.get(0)?,
                        file_id: row.get(1)?,
                        summary_text: row.get(2)?,
                        created_at: parse_timestamp(&created_at),
                        tasks: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut summary) = summary else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, task_type, task_data FROM tasks WHERE summary_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![summary.id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        for row in rows {
            let (id, task_type, task_data) = row?;
            match decode_task(&id, &task_type, &task_data) {
                Some(task) => summary.tasks.push(task),
                None => warn!("Skipping unreadable task {} of summary {}", id, summary.id),
            }
        }

        Ok(Some(summary))
    }
}

fn decode_task(id: &str, task_type: &str, task_data: &str) -> Option<Task> {
    let task_type = TaskType::from_str(task_type)?;
    let payload: serde_json::Value = serde_json::from_str(task_data).ok()?;
    let data = TaskData::from_parts(task_type, payload).ok()?;
    Some(Task {
        id: id.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmarize_core::{File, MatchingPair, User};

    fn completed_file(db: &Database) -> File {
        let user = User::new("owner@example.com");
        db.create_user(&user).unwrap();
        let file = File::new(&user.id, "a.pdf", "k", "application/pdf");
        db.create_file(&file).unwrap();
        db.mark_file_processing(&file.id).unwrap();
        db.mark_file_completed(&file.id, "some text").unwrap();
        file
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(TaskData::MultipleChoice {
                question: "2 + 2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_answer: "4".to_string(),
            }),
            Task::new(TaskData::OpenQuestion {
                question: "Explain addition.".to_string(),
            }),
            Task::new(TaskData::Matching {
                pairs: vec![MatchingPair::new("one", "1"), MatchingPair::new("two", "2")],
            }),
        ]
    }

    #[test]
    fn test_summary_with_tasks_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let file = completed_file(&db);

        let tasks = sample_tasks();
        let summary = Summary::new(&file.id, "Short summary.").with_tasks(tasks.clone());
        db.create_summary(&summary).unwrap();

        let detail = db.get_file_detail(&file.id).unwrap();
        let stored = detail.summary.expect("summary present");
        assert_eq!(stored.summary_text, "Short summary.");
        assert_eq!(stored.tasks, tasks);
    }

    #[test]
    fn test_second_summary_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let file = completed_file(&db);

        db.create_summary(&Summary::new(&file.id, "first")).unwrap();
        let err = db.create_summary(&Summary::new(&file.id, "second")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn test_summary_requires_completed_file() {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("owner@example.com");
        db.create_user(&user).unwrap();
        let file = File::new(&user.id, "a.pdf", "k", "application/pdf");
        db.create_file(&file).unwrap();

        let err = db
            .create_summary(&Summary::new(&file.id, "too early").with_tasks(sample_tasks()))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // Nothing was written
        assert!(db.get_summary_for_file(&file.id).unwrap().is_none());
    }

    #[test]
    fn test_summary_for_missing_file() {
        let db = Database::open_in_memory().unwrap();
        let err = db.create_summary(&Summary::new("ghost", "text")).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
