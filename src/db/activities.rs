//! Activity CRUD.

use super::{Database, now_ms};
use crate::error::AppError;
use crate::types::{Activity, ActivityFields};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const ACTIVITY_COLUMNS: &str = "id, expected_outcome_id, title, description, category,
     progress_percentage, implementation_level, created_at, updated_at";

fn parse_activity_row(row: &Row) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        expected_outcome_id: row.get("expected_outcome_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        progress_percentage: row.get("progress_percentage")?,
        implementation_level: row.get("implementation_level")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn get_activity_internal(conn: &Connection, activity_id: i64) -> Result<Option<Activity>> {
    let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![activity_id], parse_activity_row)
        .optional()?)
}

/// Activities of an outcome, oldest first.
pub(crate) fn list_activities_internal(conn: &Connection, outcome_id: i64) -> Result<Vec<Activity>> {
    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities
         WHERE expected_outcome_id = ?1
         ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![outcome_id], parse_activity_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    pub fn create_activity(&self, outcome_id: i64, fields: &ActivityFields) -> Result<Activity> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activities (expected_outcome_id, title, description, category,
                                         progress_percentage, implementation_level,
                                         created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    outcome_id,
                    fields.title,
                    fields.description,
                    fields.category,
                    fields.progress_percentage,
                    fields.implementation_level,
                    now,
                ],
            )?;

            Ok(Activity {
                id: conn.last_insert_rowid(),
                expected_outcome_id: outcome_id,
                title: fields.title.clone(),
                description: fields.description.clone(),
                category: fields.category,
                progress_percentage: fields.progress_percentage,
                implementation_level: fields.implementation_level.clone(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_activity(&self, activity_id: i64) -> Result<Option<Activity>> {
        self.with_conn(|conn| get_activity_internal(conn, activity_id))
    }

    pub fn list_activities(&self, outcome_id: i64) -> Result<Vec<Activity>> {
        self.with_conn(|conn| list_activities_internal(conn, outcome_id))
    }

    /// Update an activity and bump `updated_at`.
    pub fn update_activity(&self, activity_id: i64, fields: &ActivityFields) -> Result<Activity> {
        let now = now_ms();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE activities SET title = ?1, description = ?2, category = ?3,
                                       progress_percentage = ?4, implementation_level = ?5,
                                       updated_at = ?6
                 WHERE id = ?7",
                params![
                    fields.title,
                    fields.description,
                    fields.category,
                    fields.progress_percentage,
                    fields.implementation_level,
                    now,
                    activity_id,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found(format!("activity {}", activity_id)).into());
            }
            get_activity_internal(conn, activity_id)?
                .ok_or_else(|| AppError::not_found(format!("activity {}", activity_id)).into())
        })
    }

    pub fn delete_activity(&self, activity_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("DELETE FROM activities WHERE id = ?1", params![activity_id])?;
            if changed == 0 {
                return Err(AppError::not_found(format!("activity {}", activity_id)).into());
            }
            Ok(())
        })
    }
}
