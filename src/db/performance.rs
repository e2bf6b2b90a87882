//! Gathers the contributions an objective's performance is computed from.

use crate::performance::{Contribution, aggregate};
use anyhow::Result;
use rusqlite::{Connection, params};

/// Every task and activity reachable through the objective's outcomes.
pub(crate) fn contributions_internal(conn: &Connection, objective_id: i64) -> Result<Vec<Contribution>> {
    let mut items = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT t.status, t.completion_percentage
         FROM tasks t
         INNER JOIN expected_outcomes eo ON t.expected_outcome_id = eo.id
         WHERE eo.objective_id = ?1",
    )?;
    let tasks = stmt.query_map(params![objective_id], |row| {
        Ok(Contribution::Task {
            status: row.get(0)?,
            completion: row.get(1)?,
        })
    })?;
    for task in tasks {
        items.push(task?);
    }

    let mut stmt = conn.prepare(
        "SELECT a.progress_percentage
         FROM activities a
         INNER JOIN expected_outcomes eo ON a.expected_outcome_id = eo.id
         WHERE eo.objective_id = ?1",
    )?;
    let activities = stmt.query_map(params![objective_id], |row| {
        Ok(Contribution::Activity {
            progress: row.get(0)?,
        })
    })?;
    for activity in activities {
        items.push(activity?);
    }

    Ok(items)
}

pub(crate) fn objective_performance_internal(conn: &Connection, objective_id: i64) -> Result<f64> {
    Ok(aggregate(&contributions_internal(conn, objective_id)?))
}
