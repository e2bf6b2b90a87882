//! Activity operations.

use super::{check_percentage, gate, parse_choice, require_text};
use crate::access::{Action, Resource};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{Activity, ActivityCategory, ActivityFields, User};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub implementation_level: String,
}

impl ActivityInput {
    fn validate(&self) -> AppResult<ActivityFields> {
        Ok(ActivityFields {
            title: require_text("title", &self.title)?,
            description: self.description.trim().to_string(),
            category: parse_choice("category", &self.category)?,
            progress_percentage: check_percentage(
                "progress_percentage",
                self.progress_percentage,
            )?,
            implementation_level: self.implementation_level.trim().to_string(),
        })
    }
}

/// What the activity form needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityForm {
    pub activity: Option<Activity>,
    pub outcome_id: i64,
    pub categories: &'static [ActivityCategory],
}

pub fn create_activity(
    db: &Database,
    actor: &User,
    outcome_id: i64,
    input: &ActivityInput,
) -> AppResult<Activity> {
    gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    let fields = input.validate()?;
    let activity = db.create_activity(outcome_id, &fields)?;
    info!(
        user = actor.id,
        outcome = outcome_id,
        activity = activity.id,
        "Created activity"
    );
    Ok(activity)
}

pub fn get_activity(db: &Database, actor: &User, activity_id: i64) -> AppResult<Activity> {
    gate(db, actor, Action::Read, Resource::Activity(activity_id))?;
    db.get_activity(activity_id)?
        .ok_or_else(|| AppError::not_found(format!("activity {}", activity_id)))
}

pub fn update_activity(
    db: &Database,
    actor: &User,
    activity_id: i64,
    input: &ActivityInput,
) -> AppResult<Activity> {
    gate(db, actor, Action::Write, Resource::Activity(activity_id))?;
    let fields = input.validate()?;
    let activity = db.update_activity(activity_id, &fields)?;
    info!(
        user = actor.id,
        activity = activity_id,
        progress = activity.progress_percentage,
        "Updated activity"
    );
    Ok(activity)
}

pub fn delete_activity(db: &Database, actor: &User, activity_id: i64) -> AppResult<()> {
    gate(db, actor, Action::Write, Resource::Activity(activity_id))?;
    db.delete_activity(activity_id)?;
    info!(user = actor.id, activity = activity_id, "Deleted activity");
    Ok(())
}

/// Form for a new activity under `outcome_id`.
pub fn new_activity_form(db: &Database, actor: &User, outcome_id: i64) -> AppResult<ActivityForm> {
    gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    Ok(ActivityForm {
        activity: None,
        outcome_id,
        categories: ActivityCategory::ALL,
    })
}

pub fn edit_activity_form(db: &Database, actor: &User, activity_id: i64) -> AppResult<ActivityForm> {
    gate(db, actor, Action::Write, Resource::Activity(activity_id))?;
    let activity = db
        .get_activity(activity_id)?
        .ok_or_else(|| AppError::not_found(format!("activity {}", activity_id)))?;
    Ok(ActivityForm {
        outcome_id: activity.expected_outcome_id,
        activity: Some(activity),
        categories: ActivityCategory::ALL,
    })
}
