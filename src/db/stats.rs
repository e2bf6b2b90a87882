//! Aggregation queries for dashboard counts.

use super::Database;
use anyhow::Result;
use rusqlite::params;
use serde::Serialize;

/// Task counts for one user. Anything not Completed counts as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

impl Database {
    pub fn task_counts(&self, user_id: i64) -> Result<TaskCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'Completed' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status != 'Completed' THEN 1 ELSE 0 END), 0)
                 FROM tasks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(TaskCounts {
                        total: row.get(0)?,
                        completed: row.get(1)?,
                        pending: row.get(2)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }
}
