//! Task operations.

use super::{check_percentage, gate, parse_choice, parse_date, require_text};
use crate::access::{Action, OwnerChain, Resource, authorize};
use crate::db::{Database, now_ms};
use crate::error::{AppError, AppResult};
use crate::types::{
    ExpectedOutcome, Objective, Task, TaskFields, TaskPriority, TaskStatus, TaskType, User,
    completed_at_after,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Task form as submitted. Empty choices fall back to Medium, Pending and Personal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub expected_outcome_id: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub requested_by: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub completion_percentage: f64,
}

fn choice_or<T>(field: &str, value: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr<Err = crate::types::ParseEnumError>,
{
    if value.trim().is_empty() {
        Ok(default)
    } else {
        parse_choice(field, value)
    }
}

impl TaskInput {
    fn validate(&self) -> AppResult<TaskFields> {
        Ok(TaskFields {
            expected_outcome_id: self.expected_outcome_id,
            assigned_to: self.assigned_to,
            title: require_text("title", &self.title)?,
            description: self.description.trim().to_string(),
            priority: choice_or("priority", &self.priority, TaskPriority::Medium)?,
            status: choice_or("status", &self.status, TaskStatus::Pending)?,
            task_type: choice_or("task_type", &self.task_type, TaskType::Personal)?,
            requested_by: self.requested_by.trim().to_string(),
            due_date: parse_date("due_date", &self.due_date)?,
            completion_percentage: check_percentage(
                "completion_percentage",
                self.completion_percentage,
            )?,
        })
    }
}

/// An objective with its outcomes, for linking a task.
#[derive(Debug, Clone, Serialize)]
pub struct LinkableObjective {
    pub objective: Objective,
    pub outcomes: Vec<ExpectedOutcome>,
}

/// What the task form needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct TaskForm {
    pub task: Option<Task>,
    pub objectives: Vec<LinkableObjective>,
    pub priorities: &'static [TaskPriority],
    pub statuses: &'static [TaskStatus],
    pub task_types: &'static [TaskType],
}

/// Check the weak references a task carries.
fn check_links(db: &Database, actor: &User, fields: &TaskFields) -> AppResult<()> {
    if let Some(outcome_id) = fields.expected_outcome_id {
        gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    }
    if let Some(user_id) = fields.assigned_to {
        if db.get_user(user_id)?.is_none() {
            return Err(AppError::invalid(
                "assigned_to",
                format!("user {} does not exist", user_id),
            ));
        }
    }
    Ok(())
}

pub fn create_task(db: &Database, actor: &User, input: &TaskInput) -> AppResult<Task> {
    authorize(actor, Action::Write, Some(&OwnerChain::of(actor)))?;
    let mut fields = input.validate()?;
    check_links(db, actor, &fields)?;

    let now = now_ms();
    let completed_at = completed_at_after(None, fields.status, now);
    if fields.status == TaskStatus::Completed {
        fields.completion_percentage = 100.0;
    }
    let task = db.create_task(actor.id, &fields, now, completed_at)?;
    info!(
        user = actor.id,
        task = task.id,
        outcome = ?task.expected_outcome_id,
        status = %task.status,
        "Created task"
    );
    Ok(task)
}

/// Update a task. Completion timestamps follow the status change.
pub fn update_task(db: &Database, actor: &User, task_id: i64, input: &TaskInput) -> AppResult<Task> {
    gate(db, actor, Action::Write, Resource::Task(task_id))?;
    let fields = input.validate()?;
    check_links(db, actor, &fields)?;

    let mut task = db
        .get_task(task_id)?
        .ok_or_else(|| AppError::not_found(format!("task {}", task_id)))?;
    let previous = task.status;
    task.apply(fields, now_ms());
    let task = db.update_task(&task)?;
    info!(
        user = actor.id,
        task = task_id,
        from = %previous,
        to = %task.status,
        "Updated task"
    );
    Ok(task)
}

pub fn delete_task(db: &Database, actor: &User, task_id: i64) -> AppResult<()> {
    gate(db, actor, Action::Write, Resource::Task(task_id))?;
    db.delete_task(task_id)?;
    info!(user = actor.id, task = task_id, "Deleted task");
    Ok(())
}

pub fn my_tasks(db: &Database, actor: &User) -> AppResult<Vec<Task>> {
    let tasks = db.list_tasks_for_user(actor.id)?;
    debug!(user = actor.id, count = tasks.len(), "Listed tasks");
    Ok(tasks)
}

/// Form for a new task, or for editing `task_id`.
pub fn task_form(db: &Database, actor: &User, task_id: Option<i64>) -> AppResult<TaskForm> {
    let task = match task_id {
        Some(id) => {
            gate(db, actor, Action::Write, Resource::Task(id))?;
            db.get_task(id)?
        }
        None => None,
    };

    let mut objectives = Vec::new();
    for objective in db.list_objectives(actor.id)? {
        let outcomes = db.list_outcomes(objective.id)?;
        objectives.push(LinkableObjective {
            objective,
            outcomes,
        });
    }

    Ok(TaskForm {
        task,
        objectives,
        priorities: TaskPriority::ALL,
        statuses: TaskStatus::ALL,
        task_types: TaskType::ALL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_choices_take_defaults() {
        let input = TaskInput {
            title: "Call vendor".into(),
            ..Default::default()
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.priority, TaskPriority::Medium);
        assert_eq!(fields.status, TaskStatus::Pending);
        assert_eq!(fields.task_type, TaskType::Personal);
        assert_eq!(fields.due_date, None);
    }

    #[test]
    fn unknown_status_names_the_field() {
        let input = TaskInput {
            title: "Call vendor".into(),
            status: "Done".into(),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "status"));
    }
}
