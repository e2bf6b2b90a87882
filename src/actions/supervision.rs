//! Reviewer views: the supervisor dashboard and per-staff reports.

use super::gate;
use crate::access::{Action, Resource, authorize};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::performance::mean;
use crate::types::{Activity, Comment, CommentTarget, ExpectedOutcome, Objective, Role, Task, User};
use serde::Serialize;
use tracing::debug;

/// One row of the supervisor dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StaffPerformance {
    #[serde(flatten)]
    pub user: User,
    /// Mean of the user's objective performances, 0 with no objectives.
    pub overall_performance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewedActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewedOutcome {
    pub outcome: ExpectedOutcome,
    pub activities: Vec<ReviewedActivity>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewedObjective {
    pub objective: Objective,
    pub comments: Vec<Comment>,
    pub outcomes: Vec<ReviewedOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffReport {
    pub staff: User,
    pub objectives: Vec<ReviewedObjective>,
    pub tasks: Vec<Task>,
}

fn overall_performance(db: &Database, user_id: i64) -> AppResult<f64> {
    let objectives = db.list_objectives(user_id)?;
    Ok(mean(objectives.iter().map(|o| o.performance)))
}

/// Admins see every user; Supervisors see their direct reports.
pub fn supervisor_dashboard(db: &Database, actor: &User) -> AppResult<Vec<StaffPerformance>> {
    authorize(actor, Action::Supervise, None)?;
    let staff = if actor.role == Role::Admin {
        db.list_users()?
    } else {
        db.list_users_by_supervisor(actor.id)?
    };

    let mut rows = Vec::with_capacity(staff.len());
    for user in staff {
        rows.push(StaffPerformance {
            overall_performance: overall_performance(db, user.id)?,
            user,
        });
    }
    debug!(actor = actor.id, rows = rows.len(), "Built supervisor dashboard");
    Ok(rows)
}

/// Full review of one staff member, comments included.
pub fn staff_report(db: &Database, actor: &User, staff_id: i64) -> AppResult<StaffReport> {
    authorize(actor, Action::Supervise, None)?;
    gate(db, actor, Action::Read, Resource::User(staff_id))?;
    let staff = db
        .get_user(staff_id)?
        .ok_or_else(|| AppError::not_found(format!("user {}", staff_id)))?;

    let mut objectives = Vec::new();
    for tree in db.objective_trees(staff_id)? {
        let mut outcomes = Vec::with_capacity(tree.outcomes.len());
        for branch in tree.outcomes {
            let mut activities = Vec::with_capacity(branch.activities.len());
            for activity in branch.activities {
                activities.push(ReviewedActivity {
                    comments: db.list_comments(CommentTarget::Activity(activity.id))?,
                    activity,
                });
            }
            outcomes.push(ReviewedOutcome {
                outcome: branch.outcome,
                activities,
                tasks: branch.tasks,
            });
        }
        objectives.push(ReviewedObjective {
            comments: db.list_comments(CommentTarget::Objective(tree.objective.id))?,
            objective: tree.objective,
            outcomes,
        });
    }

    Ok(StaffReport {
        tasks: db.list_tasks_for_user(staff_id)?,
        staff,
        objectives,
    })
}
