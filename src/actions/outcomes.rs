//! Expected outcome operations. Outcomes inherit their objective's owner.

use super::{gate, require_text};
use crate::access::{Action, Resource};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{ExpectedOutcome, Objective, OutcomeFields, User};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutcomeInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl OutcomeInput {
    fn validate(&self) -> AppResult<OutcomeFields> {
        Ok(OutcomeFields {
            title: require_text("title", &self.title)?,
            description: self.description.trim().to_string(),
        })
    }
}

pub fn create_outcome(
    db: &Database,
    actor: &User,
    objective_id: i64,
    input: &OutcomeInput,
) -> AppResult<ExpectedOutcome> {
    gate(db, actor, Action::Write, Resource::Objective(objective_id))?;
    let fields = input.validate()?;
    let outcome = db.create_outcome(objective_id, &fields)?;
    info!(
        user = actor.id,
        objective = objective_id,
        outcome = outcome.id,
        "Created expected outcome"
    );
    Ok(outcome)
}

/// The objective a new outcome would be added to. Owner only.
pub fn outcome_parent(db: &Database, actor: &User, objective_id: i64) -> AppResult<Objective> {
    gate(db, actor, Action::Write, Resource::Objective(objective_id))?;
    db.get_objective(objective_id)?
        .ok_or_else(|| AppError::not_found(format!("objective {}", objective_id)))
}

/// Fetch an outcome for its edit or delete form. Owner only.
pub fn editable_outcome(db: &Database, actor: &User, outcome_id: i64) -> AppResult<ExpectedOutcome> {
    gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    db.get_outcome(outcome_id)?
        .ok_or_else(|| AppError::not_found(format!("expected outcome {}", outcome_id)))
}

pub fn update_outcome(
    db: &Database,
    actor: &User,
    outcome_id: i64,
    input: &OutcomeInput,
) -> AppResult<ExpectedOutcome> {
    gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    let fields = input.validate()?;
    let outcome = db.update_outcome(outcome_id, &fields)?;
    info!(user = actor.id, outcome = outcome_id, "Updated expected outcome");
    Ok(outcome)
}

/// Removes the outcome with its activities and every task linked to it.
pub fn delete_outcome(db: &Database, actor: &User, outcome_id: i64) -> AppResult<()> {
    gate(db, actor, Action::Write, Resource::Outcome(outcome_id))?;
    db.delete_outcome(outcome_id)?;
    info!(user = actor.id, outcome = outcome_id, "Deleted expected outcome");
    Ok(())
}
