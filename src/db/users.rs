//! User CRUD operations.

use super::{Database, is_unique_violation, now_ms};
use crate::error::AppError;
use crate::types::{Role, User, UserProfile};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};

const USER_COLUMNS: &str = "id, username, password_hash, full_name, email, role, supervisor_id,
     department, position, created_at";

pub fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        role: row.get("role")?,
        supervisor_id: row.get("supervisor_id")?,
        department: row.get("department")?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a user using an existing connection (avoids deadlock).
pub(crate) fn get_user_internal(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let user = conn
        .query_row(&sql, params![user_id], parse_user_row)
        .optional()?;
    Ok(user)
}

fn list_users_where(
    conn: &Connection,
    clause: &str,
    param: Option<&dyn ToSql>,
) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users {clause} ORDER BY username ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(param), parse_user_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn map_unique(err: rusqlite::Error, username: &str) -> anyhow::Error {
    if is_unique_violation(&err) {
        AppError::conflict(format!("username '{}' is already taken", username)).into()
    } else {
        err.into()
    }
}

impl Database {
    /// Create a user. Fails with `Conflict` when the username is taken.
    pub fn create_user(&self, profile: &UserProfile, password_hash: &str) -> Result<User> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, full_name, email, role,
                                    supervisor_id, department, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    profile.username,
                    password_hash,
                    profile.full_name,
                    profile.email,
                    profile.role,
                    profile.supervisor_id,
                    profile.department,
                    profile.position,
                    now,
                ],
            )
            .map_err(|e| map_unique(e, &profile.username))?;

            Ok(User {
                id: conn.last_insert_rowid(),
                username: profile.username.clone(),
                password_hash: password_hash.to_string(),
                full_name: profile.full_name.clone(),
                email: profile.email.clone(),
                role: profile.role,
                supervisor_id: profile.supervisor_id,
                department: profile.department.clone(),
                position: profile.position.clone(),
                created_at: now,
            })
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| get_user_internal(conn, user_id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
            let user = conn
                .query_row(&sql, params![username], parse_user_row)
                .optional()?;
            Ok(user)
        })
    }

    /// Update a user's profile. `None` for the hash leaves the stored credential unchanged.
    pub fn update_user(
        &self,
        user_id: i64,
        profile: &UserProfile,
        password_hash: Option<&str>,
    ) -> Result<User> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users SET username = ?1, full_name = ?2, email = ?3, role = ?4,
                                      supervisor_id = ?5, department = ?6, position = ?7,
                                      password_hash = COALESCE(?8, password_hash)
                     WHERE id = ?9",
                    params![
                        profile.username,
                        profile.full_name,
                        profile.email,
                        profile.role,
                        profile.supervisor_id,
                        profile.department,
                        profile.position,
                        password_hash,
                        user_id,
                    ],
                )
                .map_err(|e| map_unique(e, &profile.username))?;

            if changed == 0 {
                return Err(AppError::not_found(format!("user {}", user_id)).into());
            }
            get_user_internal(conn, user_id)?
                .ok_or_else(|| AppError::not_found(format!("user {}", user_id)).into())
        })
    }

    /// Delete a user and, by cascade, everything they own.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
            if changed == 0 {
                return Err(AppError::not_found(format!("user {}", user_id)).into());
            }
            Ok(())
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| list_users_where(conn, "", None))
    }

    pub fn list_users_by_role(&self, role: Role) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            list_users_where(conn, "WHERE role = ?1", Some(&role as &dyn ToSql))
        })
    }

    /// Direct reports of the given supervisor.
    pub fn list_users_by_supervisor(&self, supervisor_id: i64) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            list_users_where(
                conn,
                "WHERE supervisor_id = ?1",
                Some(&supervisor_id as &dyn ToSql),
            )
        })
    }

    pub fn count_subordinates(&self, supervisor_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE supervisor_id = ?1",
                params![supervisor_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn count_users_with_role(&self, role: Role) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1",
                params![role],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
