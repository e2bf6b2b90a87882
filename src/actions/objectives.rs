//! Objective operations.

use super::{gate, parse_date, require_text};
use crate::access::{Action, OwnerChain, Resource, authorize};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{Objective, ObjectiveFields, ObjectiveTree, User};
use serde::Deserialize;
use tracing::{debug, info};

/// Objective form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectiveInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl ObjectiveInput {
    fn validate(&self) -> AppResult<ObjectiveFields> {
        let fields = ObjectiveFields {
            title: require_text("title", &self.title)?,
            description: self.description.trim().to_string(),
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
        };
        if let (Some(start), Some(end)) = (fields.start_date, fields.end_date) {
            if end < start {
                return Err(AppError::invalid("end_date", "end date is before start date"));
            }
        }
        Ok(fields)
    }
}

pub fn create_objective(db: &Database, actor: &User, input: &ObjectiveInput) -> AppResult<Objective> {
    authorize(actor, Action::Write, Some(&OwnerChain::of(actor)))?;
    let fields = input.validate()?;
    let objective = db.create_objective(actor.id, &fields)?;
    info!(user = actor.id, objective = objective.id, "Created objective");
    Ok(objective)
}

pub fn get_objective(db: &Database, actor: &User, objective_id: i64) -> AppResult<Objective> {
    gate(db, actor, Action::Read, Resource::Objective(objective_id))?;
    db.get_objective(objective_id)?
        .ok_or_else(|| AppError::not_found(format!("objective {}", objective_id)))
}

/// Fetch an objective for its edit or delete form. Owner only.
pub fn editable_objective(db: &Database, actor: &User, objective_id: i64) -> AppResult<Objective> {
    gate(db, actor, Action::Write, Resource::Objective(objective_id))?;
    db.get_objective(objective_id)?
        .ok_or_else(|| AppError::not_found(format!("objective {}", objective_id)))
}

pub fn update_objective(
    db: &Database,
    actor: &User,
    objective_id: i64,
    input: &ObjectiveInput,
) -> AppResult<Objective> {
    gate(db, actor, Action::Write, Resource::Objective(objective_id))?;
    let fields = input.validate()?;
    let objective = db.update_objective(objective_id, &fields)?;
    info!(user = actor.id, objective = objective_id, "Updated objective");
    Ok(objective)
}

pub fn delete_objective(db: &Database, actor: &User, objective_id: i64) -> AppResult<()> {
    gate(db, actor, Action::Write, Resource::Objective(objective_id))?;
    db.delete_objective(objective_id)?;
    info!(user = actor.id, objective = objective_id, "Deleted objective");
    Ok(())
}

/// The acting user's own objective trees.
pub fn my_objective_trees(db: &Database, actor: &User) -> AppResult<Vec<ObjectiveTree>> {
    let trees = db.objective_trees(actor.id)?;
    debug!(user = actor.id, count = trees.len(), "Loaded objective trees");
    Ok(trees)
}
