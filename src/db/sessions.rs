//! Login sessions keyed by an opaque token.

use super::Database;
use super::users::parse_user_row;
use crate::types::User;
use anyhow::Result;
use rusqlite::{OptionalExtension, params};

impl Database {
    pub fn create_session(&self, token: &str, user_id: i64, now: i64, expires_at: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token, user_id, now, expires_at],
            )?;
            Ok(())
        })
    }

    /// The user behind a live session. Expired sessions resolve to `None`.
    pub fn user_for_session(&self, token: &str, now: i64) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT u.id, u.username, u.password_hash, u.full_name, u.email, u.role,
                            u.supervisor_id, u.department, u.position, u.created_at
                     FROM sessions s
                     INNER JOIN users u ON s.user_id = u.id
                     WHERE s.token = ?1 AND s.expires_at > ?2",
                    params![token, now],
                    parse_user_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(())
        })
    }

    /// Remove expired sessions. Returns how many were removed.
    pub fn purge_expired_sessions(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let removed =
                conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
            Ok(removed)
        })
    }
}
