//! Supervisor comments on objectives and activities.

use super::{Database, now_ms};
use crate::error::AppError;
use crate::types::{Comment, CommentTarget};
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COMMENT_COLUMNS: &str = "id, objective_id, activity_id, user_id, comment_text, created_at";

#[derive(Debug, thiserror::Error)]
#[error("comment {0} must target exactly one of objective or activity")]
struct InvalidTarget(i64);

fn parse_comment_row(row: &Row) -> rusqlite::Result<Comment> {
    let id: i64 = row.get("id")?;
    let target = CommentTarget::from_columns(row.get("objective_id")?, row.get("activity_id")?)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Null, Box::new(InvalidTarget(id)))
        })?;
    Ok(Comment {
        id,
        target,
        user_id: row.get("user_id")?,
        comment_text: row.get("comment_text")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn get_comment_internal(conn: &Connection, comment_id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![comment_id], parse_comment_row)
        .optional()?)
}

/// Comments on one target, newest first.
pub(crate) fn list_comments_internal(conn: &Connection, target: CommentTarget) -> Result<Vec<Comment>> {
    let column = match target {
        CommentTarget::Objective(_) => "objective_id",
        CommentTarget::Activity(_) => "activity_id",
    };
    let id = match target {
        CommentTarget::Objective(id) | CommentTarget::Activity(id) => id,
    };
    let sql = format!(
        "SELECT {COMMENT_COLUMNS} FROM comments
         WHERE {column} = ?1
         ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![id], parse_comment_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    pub fn create_comment(&self, target: CommentTarget, user_id: i64, text: &str) -> Result<Comment> {
        let now = now_ms();
        let (objective_id, activity_id) = target.columns();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (objective_id, activity_id, user_id, comment_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![objective_id, activity_id, user_id, text, now],
            )?;

            Ok(Comment {
                id: conn.last_insert_rowid(),
                target,
                user_id,
                comment_text: text.to_string(),
                created_at: now,
            })
        })
    }

    pub fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        self.with_conn(|conn| get_comment_internal(conn, comment_id))
    }

    pub fn list_comments(&self, target: CommentTarget) -> Result<Vec<Comment>> {
        self.with_conn(|conn| list_comments_internal(conn, target))
    }

    pub fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("DELETE FROM comments WHERE id = ?1", params![comment_id])?;
            if changed == 0 {
                return Err(AppError::not_found(format!("comment {}", comment_id)).into());
            }
            Ok(())
        })
    }
}
