//! User operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{from_millis, to_millis, Database};
use crate::error::{Error, Result};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, created_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: from_millis(row.get(3)?),
    })
}

impl Database {
    /// Look up a user by email, creating one on first sight
    pub fn get_or_create_user(&self, email: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(Error::InvalidData("User email is required".into()));
        }

        if let Some(user) = self.get_user_by_email(&email)? {
            return Ok(user);
        }

        let name = email.split('@').next().unwrap_or(&email).to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (email, name, created_at) VALUES (?, ?, ?)",
            params![email, name, to_millis(Utc::now())],
        )?;
        drop(conn);

        tracing::debug!(email = %email, "Created user");
        self.get_user_by_email(&email)?
            .ok_or_else(|| Error::NotFound(format!("User {}", email)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email.trim().to_lowercase()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Resolve a list of emails to user ids, creating users as needed
    pub fn resolve_user_ids(&self, emails: &[String]) -> Result<Vec<i64>> {
        emails
            .iter()
            .map(|email| self.get_or_create_user(email).map(|u| u.id))
            .collect()
    }
}
