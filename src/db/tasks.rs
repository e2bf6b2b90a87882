//! Task CRUD operations.

use super::Database;
use crate::error::AppError;
use crate::types::{Task, TaskFields};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, user_id, expected_outcome_id, assigned_to, title, description,
     priority, status, task_type, requested_by, due_date, completion_percentage,
     created_at, completed_at";

// Undated tasks sink to the bottom; ties go to the newest.
const TASK_ORDER: &str = "ORDER BY due_date IS NULL, due_date ASC, created_at DESC, id DESC";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        expected_outcome_id: row.get("expected_outcome_id")?,
        assigned_to: row.get("assigned_to")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: row.get("priority")?,
        status: row.get("status")?,
        task_type: row.get("task_type")?,
        requested_by: row.get("requested_by")?,
        due_date: row.get("due_date")?,
        completion_percentage: row.get("completion_percentage")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
pub(crate) fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![task_id], parse_task_row)
        .optional()?)
}

pub(crate) fn list_tasks_for_user_internal(conn: &Connection, user_id: i64) -> Result<Vec<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 {TASK_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], parse_task_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn list_tasks_for_outcome_internal(conn: &Connection, outcome_id: i64) -> Result<Vec<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE expected_outcome_id = ?1 {TASK_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![outcome_id], parse_task_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    /// Insert a task. The caller decides `completed_at` and the stored
    /// percentage from the status, so every write path agrees.
    pub fn create_task(
        &self,
        user_id: i64,
        fields: &TaskFields,
        created_at: i64,
        completed_at: Option<i64>,
    ) -> Result<Task> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (user_id, expected_outcome_id, assigned_to, title, description,
                                    priority, status, task_type, requested_by, due_date,
                                    completion_percentage, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    user_id,
                    fields.expected_outcome_id,
                    fields.assigned_to,
                    fields.title,
                    fields.description,
                    fields.priority,
                    fields.status,
                    fields.task_type,
                    fields.requested_by,
                    fields.due_date,
                    fields.completion_percentage,
                    created_at,
                    completed_at,
                ],
            )?;
            let id = conn.last_insert_rowid();
            get_task_internal(conn, id)?
                .ok_or_else(|| AppError::not_found(format!("task {}", id)).into())
        })
    }

    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Persist every mutable column of `task`.
    pub fn update_task(&self, task: &Task) -> Result<Task> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET expected_outcome_id = ?1, assigned_to = ?2, title = ?3,
                                  description = ?4, priority = ?5, status = ?6, task_type = ?7,
                                  requested_by = ?8, due_date = ?9, completion_percentage = ?10,
                                  completed_at = ?11
                 WHERE id = ?12",
                params![
                    task.expected_outcome_id,
                    task.assigned_to,
                    task.title,
                    task.description,
                    task.priority,
                    task.status,
                    task.task_type,
                    task.requested_by,
                    task.due_date,
                    task.completion_percentage,
                    task.completed_at,
                    task.id,
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found(format!("task {}", task.id)).into());
            }
            get_task_internal(conn, task.id)?
                .ok_or_else(|| AppError::not_found(format!("task {}", task.id)).into())
        })
    }

    pub fn delete_task(&self, task_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            if changed == 0 {
                return Err(AppError::not_found(format!("task {}", task_id)).into());
            }
            Ok(())
        })
    }

    /// A user's tasks, soonest due first; tasks without a due date come last.
    pub fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| list_tasks_for_user_internal(conn, user_id))
    }

    pub fn list_tasks_for_outcome(&self, outcome_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| list_tasks_for_outcome_internal(conn, outcome_id))
    }
}
