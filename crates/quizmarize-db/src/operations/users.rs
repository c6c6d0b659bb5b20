//! User operations.

use super::parse_timestamp;
use crate::database::Database;
use crate::error::{DbError, DbResult};
use quizmarize_core::User;
use rusqlite::params;
use tracing::info;

impl Database {
    /// Create a new user.
    pub fn create_user(&self, user: &User) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, email, is_active, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id,
                user.email,
                user.is_active,
                user.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Conflict(format!("User already exists: {}", user.email))
            }
            _ => DbError::from(e),
        })?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> DbResult<User> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, email, is_active, created_at FROM users WHERE id = ?1",
            params![id],
            row_to_user,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("User not found: {}", id)),
            _ => DbError::from(e),
        })
    }

    /// Find a user by email.
    pub fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, email, is_active, created_at FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Enable or disable a user. Disabled users cannot authenticate.
    pub fn set_user_active(&self, id: &str, active: bool) -> DbResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE users SET is_active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("User not found: {}", id)));
        }
        info!("User {} is now {}", id, if active { "active" } else { "inactive" });
        Ok(())
    }

    /// Return the user with this email, creating it on first sight.
    ///
    /// A concurrent caller may insert the same email between the lookup and
    /// the insert; the row it created is returned instead.
    pub fn get_or_create_user(&self, email: &str) -> DbResult<User> {
        if let Some(user) = self.find_user_by_email(email)? {
            return Ok(user);
        }

        let user = User::new(email);
        match self.create_user(&user) {
            Ok(()) => {
                info!("Created user {} ({})", user.id, user.email);
                Ok(user)
            }
            Err(DbError::Conflict(_)) => self
                .find_user_by_email(email)?
                .ok_or_else(|| DbError::NotFound(format!("User not found: {}", email))),
            Err(e) => Err(e),
        }
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        is_active: row.get(2)?,
        created_at: parse_timestamp(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_crud() {
        let db = Database::open_in_memory().unwrap();

        let user = User::new("ada@example.com");
        db.create_user(&user).unwrap();

        let fetched = db.get_user(&user.id).unwrap();
        assert_eq!(fetched.email, "ada@example.com");
        assert!(fetched.is_active);

        assert!(matches!(db.get_user("missing"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&User::new("ada@example.com")).unwrap();

        let err = db.create_user(&User::new("ada@example.com")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn test_get_or_create_user() {
        let db = Database::open_in_memory().unwrap();

        let first = db.get_or_create_user("bob@example.com").unwrap();
        let second = db.get_or_create_user("bob@example.com").unwrap();
        assert_eq!(first.id, second.id);

        assert!(db.find_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_get_or_create_user_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("users.db")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.get_or_create_user("race@example.com"))
            })
            .collect();

        let ids: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap().id)
            .collect();
        assert!(ids.iter().all(|id| id == &ids[0]));
    }

    #[test]
    fn test_set_user_active() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user("eve@example.com").unwrap();

        db.set_user_active(&user.id, false).unwrap();
        assert!(!db.get_user(&user.id).unwrap().is_active);

        db.set_user_active(&user.id, true).unwrap();
        assert!(db.get_user(&user.id).unwrap().is_active);

        assert!(matches!(db.set_user_active("ghost", false), Err(DbError::NotFound(_))));
    }
}
