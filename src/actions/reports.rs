//! The acting user's own dashboard and report.

use crate::db::Database;
use crate::error::AppResult;
use crate::performance::mean;
use crate::types::{ObjectiveTree, Task, User};
use serde::Serialize;

/// Headline numbers for the personal dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_objectives: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub average_performance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub summary: Summary,
    pub recent_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub user: User,
    pub summary: Summary,
    pub objectives: Vec<ObjectiveTree>,
    pub tasks: Vec<Task>,
}

const RECENT_TASKS: usize = 5;

fn summary(db: &Database, user_id: i64) -> AppResult<Summary> {
    let counts = db.task_counts(user_id)?;
    let objectives = db.list_objectives(user_id)?;
    Ok(Summary {
        total_objectives: objectives.len() as i64,
        total_tasks: counts.total,
        completed_tasks: counts.completed,
        pending_tasks: counts.pending,
        average_performance: mean(objectives.iter().map(|o| o.performance)),
    })
}

pub fn dashboard(db: &Database, actor: &User) -> AppResult<Dashboard> {
    let mut recent_tasks = db.list_tasks_for_user(actor.id)?;
    recent_tasks.truncate(RECENT_TASKS);
    Ok(Dashboard {
        user: actor.clone(),
        summary: summary(db, actor.id)?,
        recent_tasks,
    })
}

pub fn report(db: &Database, actor: &User) -> AppResult<Report> {
    Ok(Report {
        user: actor.clone(),
        summary: summary(db, actor.id)?,
        objectives: db.objective_trees(actor.id)?,
        tasks: db.list_tasks_for_user(actor.id)?,
    })
}
