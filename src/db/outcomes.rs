//! Expected outcome CRUD.

use super::{Database, now_ms};
use crate::error::AppError;
use crate::types::{ExpectedOutcome, OutcomeFields};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const OUTCOME_COLUMNS: &str = "id, objective_id, title, description, created_at";

fn parse_outcome_row(row: &Row) -> rusqlite::Result<ExpectedOutcome> {
    Ok(ExpectedOutcome {
        id: row.get("id")?,
        objective_id: row.get("objective_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn get_outcome_internal(conn: &Connection, outcome_id: i64) -> Result<Option<ExpectedOutcome>> {
    let sql = format!("SELECT {OUTCOME_COLUMNS} FROM expected_outcomes WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![outcome_id], parse_outcome_row)
        .optional()?)
}

/// Outcomes of an objective, oldest first.
pub(crate) fn list_outcomes_internal(conn: &Connection, objective_id: i64) -> Result<Vec<ExpectedOutcome>> {
    let sql = format!(
        "SELECT {OUTCOME_COLUMNS} FROM expected_outcomes
         WHERE objective_id = ?1
         ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![objective_id], parse_outcome_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    pub fn create_outcome(&self, objective_id: i64, fields: &OutcomeFields) -> Result<ExpectedOutcome> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO expected_outcomes (objective_id, title, description, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![objective_id, fields.title, fields.description, now],
            )?;

            Ok(ExpectedOutcome {
                id: conn.last_insert_rowid(),
                objective_id,
                title: fields.title.clone(),
                description: fields.description.clone(),
                created_at: now,
            })
        })
    }

    pub fn get_outcome(&self, outcome_id: i64) -> Result<Option<ExpectedOutcome>> {
        self.with_conn(|conn| get_outcome_internal(conn, outcome_id))
    }

    pub fn list_outcomes(&self, objective_id: i64) -> Result<Vec<ExpectedOutcome>> {
        self.with_conn(|conn| list_outcomes_internal(conn, objective_id))
    }

    pub fn update_outcome(&self, outcome_id: i64, fields: &OutcomeFields) -> Result<ExpectedOutcome> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE expected_outcomes SET title = ?1, description = ?2 WHERE id = ?3",
                params![fields.title, fields.description, outcome_id],
            )?;
            if changed == 0 {
                return Err(AppError::not_found(format!("expected outcome {}", outcome_id)).into());
            }
            get_outcome_internal(conn, outcome_id)?
                .ok_or_else(|| AppError::not_found(format!("expected outcome {}", outcome_id)).into())
        })
    }

    /// Delete an outcome with its activities and linked tasks.
    pub fn delete_outcome(&self, outcome_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM expected_outcomes WHERE id = ?1",
                params![outcome_id],
            )?;
            if changed == 0 {
                return Err(AppError::not_found(format!("expected outcome {}", outcome_id)).into());
            }
            Ok(())
        })
    }
}
