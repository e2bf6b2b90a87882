//! Objective CRUD and the full objective tree read.

use super::activities::list_activities_internal;
use super::outcomes::list_outcomes_internal;
use super::performance::objective_performance_internal;
use super::tasks::list_tasks_for_outcome_internal;
use super::{Database, now_ms};
use crate::error::AppError;
use crate::types::{Objective, ObjectiveFields, ObjectiveTree, OutcomeTree};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const OBJECTIVE_COLUMNS: &str = "id, user_id, title, description, start_date, end_date, created_at";

/// Parse a row; performance is filled in separately.
fn parse_objective_row(row: &Row) -> rusqlite::Result<Objective> {
    Ok(Objective {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        created_at: row.get("created_at")?,
        performance: 0.0,
    })
}

fn with_performance(conn: &Connection, mut objective: Objective) -> Result<Objective> {
    objective.performance = objective_performance_internal(conn, objective.id)?;
    Ok(objective)
}

pub(crate) fn get_objective_internal(conn: &Connection, objective_id: i64) -> Result<Option<Objective>> {
    let sql = format!("SELECT {OBJECTIVE_COLUMNS} FROM objectives WHERE id = ?1");
    let objective = conn
        .query_row(&sql, params![objective_id], parse_objective_row)
        .optional()?;
    objective.map(|o| with_performance(conn, o)).transpose()
}

/// A user's objectives, newest first, each with its current performance.
pub(crate) fn list_objectives_internal(conn: &Connection, user_id: i64) -> Result<Vec<Objective>> {
    let sql = format!(
        "SELECT {OBJECTIVE_COLUMNS} FROM objectives
         WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![user_id], parse_objective_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|o| with_performance(conn, o)).collect()
}

impl Database {
    pub fn create_objective(&self, user_id: i64, fields: &ObjectiveFields) -> Result<Objective> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO objectives (user_id, title, description, start_date, end_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    fields.title,
                    fields.description,
                    fields.start_date,
                    fields.end_date,
                    now,
                ],
            )?;

            Ok(Objective {
                id: conn.last_insert_rowid(),
                user_id,
                title: fields.title.clone(),
                description: fields.description.clone(),
                start_date: fields.start_date,
                end_date: fields.end_date,
                created_at: now,
                performance: 0.0,
            })
        })
    }

    /// Get an objective with its performance recomputed.
    pub fn get_objective(&self, objective_id: i64) -> Result<Option<Objective>> {
        self.with_tx(|tx| get_objective_internal(tx, objective_id))
    }

    pub fn list_objectives(&self, user_id: i64) -> Result<Vec<Objective>> {
        self.with_tx(|tx| list_objectives_internal(tx, user_id))
    }

    pub fn update_objective(&self, objective_id: i64, fields: &ObjectiveFields) -> Result<Objective> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE objectives SET title = ?1, description = ?2, start_date = ?3, end_date = ?4
                 WHERE id = ?5",
                params![
                    fields.title,
                    fields.description,
                    fields.start_date,
                    fields.end_date,
                    objective_id,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found(format!("objective {}", objective_id)).into());
            }
            get_objective_internal(tx, objective_id)?
                .ok_or_else(|| AppError::not_found(format!("objective {}", objective_id)).into())
        })
    }

    /// Delete an objective; outcomes, activities, linked tasks and comments cascade.
    pub fn delete_objective(&self, objective_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("DELETE FROM objectives WHERE id = ?1", params![objective_id])?;
            if changed == 0 {
                return Err(AppError::not_found(format!("objective {}", objective_id)).into());
            }
            Ok(())
        })
    }

    /// A user's objectives with outcomes, activities and linked tasks,
    /// read inside a single transaction.
    pub fn objective_trees(&self, user_id: i64) -> Result<Vec<ObjectiveTree>> {
        self.with_tx(|tx| {
            let objectives = list_objectives_internal(tx, user_id)?;
            let mut trees = Vec::with_capacity(objectives.len());
            for objective in objectives {
                let mut outcomes = Vec::new();
                for outcome in list_outcomes_internal(tx, objective.id)? {
                    outcomes.push(OutcomeTree {
                        activities: list_activities_internal(tx, outcome.id)?,
                        tasks: list_tasks_for_outcome_internal(tx, outcome.id)?,
                        outcome,
                    });
                }
                trees.push(ObjectiveTree { objective, outcomes });
            }
            Ok(trees)
        })
    }
}
