//! Authorized operations.
//!
//! Each function takes the store and the acting user, validates its input,
//! runs the gate and only then touches the store. The HTTP layer calls these
//! and nothing else.

pub mod activities;
pub mod auth;
pub mod bootstrap;
pub mod comments;
pub mod objectives;
pub mod outcomes;
pub mod reports;
pub mod staff;
pub mod supervision;
pub mod tasks;

use crate::access::{Action, OwnerChain, Resource, authorize, unresolved};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{ParseEnumError, User};
use chrono::NaiveDate;
use std::str::FromStr;

/// Resolve `resource` and check that `actor` may perform `action` on it.
pub(crate) fn gate(
    db: &Database,
    actor: &User,
    action: Action,
    resource: Resource,
) -> AppResult<OwnerChain> {
    let chain = db
        .owner_chain(resource)?
        .ok_or_else(|| unresolved(actor, resource))?;
    authorize(actor, action, Some(&chain))?;
    Ok(chain)
}

/// Trimmed, non-empty text.
pub(crate) fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed.to_string())
}

/// `YYYY-MM-DD`, or `None` for an empty value.
pub(crate) fn parse_date(field: &str, value: &str) -> AppResult<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", trimmed)))
}

pub(crate) fn check_percentage(field: &str, value: f64) -> AppResult<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::invalid(field, "must be between 0 and 100"));
    }
    Ok(value)
}

/// Parse one of the stored enumerations from its display string.
pub(crate) fn parse_choice<T>(field: &str, value: &str) -> AppResult<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .trim()
        .parse()
        .map_err(|e: ParseEnumError| AppError::invalid(field, e.to_string()))
}
