//! User management. Admin only, except for [`provision_user`] which the CLI,
//! bootstrap and self-registration use to create accounts directly.

use super::{gate, parse_choice, require_text};
use crate::access::{Action, Resource, authorize};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::password::hash_password;
use crate::types::{Role, User, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::info;

/// User form as submitted. An empty password on update keeps the current one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub supervisor_id: Option<i64>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

impl UserInput {
    fn profile(&self) -> AppResult<UserProfile> {
        Ok(UserProfile {
            username: require_text("username", &self.username)?,
            full_name: require_text("full_name", &self.full_name)?,
            email: self.email.trim().to_string(),
            role: parse_choice("role", &self.role)?,
            supervisor_id: self.supervisor_id,
            department: self.department.trim().to_string(),
            position: self.position.trim().to_string(),
        })
    }
}

/// A user with their supervisor's username, for the staff list.
#[derive(Debug, Clone, Serialize)]
pub struct StaffEntry {
    #[serde(flatten)]
    pub user: User,
    pub supervisor_username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffForm {
    pub user: Option<User>,
    /// Users that may be picked as supervisor: Supervisors and Admins.
    pub supervisors: Vec<User>,
    pub roles: &'static [Role],
}

/// A supervisor must exist, be able to review, and not be the user themself.
fn check_supervisor(db: &Database, user_id: Option<i64>, supervisor_id: Option<i64>) -> AppResult<()> {
    let Some(supervisor_id) = supervisor_id else {
        return Ok(());
    };
    if user_id == Some(supervisor_id) {
        return Err(AppError::invalid(
            "supervisor_id",
            "a user cannot supervise themself",
        ));
    }
    match db.get_user(supervisor_id)? {
        Some(supervisor) if supervisor.role.is_reviewer() => Ok(()),
        Some(_) => Err(AppError::invalid(
            "supervisor_id",
            "supervisor must be an Admin or Supervisor",
        )),
        None => Err(AppError::invalid(
            "supervisor_id",
            format!("user {} does not exist", supervisor_id),
        )),
    }
}

/// Create an account without an acting user.
pub fn provision_user(db: &Database, input: &UserInput) -> AppResult<User> {
    let profile = input.profile()?;
    if input.password.is_empty() {
        return Err(AppError::missing_field("password"));
    }
    check_supervisor(db, None, profile.supervisor_id)?;
    let hash = hash_password(&input.password)?;
    let user = db.create_user(&profile, &hash)?;
    info!(user = user.id, username = %user.username, role = %user.role, "Created user");
    Ok(user)
}

pub fn create_user(db: &Database, actor: &User, input: &UserInput) -> AppResult<User> {
    authorize(actor, Action::ManageUsers, None)?;
    provision_user(db, input)
}

pub fn update_user(db: &Database, actor: &User, user_id: i64, input: &UserInput) -> AppResult<User> {
    authorize(actor, Action::ManageUsers, None)?;
    let current = db
        .get_user(user_id)?
        .ok_or_else(|| AppError::not_found(format!("user {}", user_id)))?;

    let profile = input.profile()?;
    check_supervisor(db, Some(user_id), profile.supervisor_id)?;
    if profile.role == Role::Staff && current.role != Role::Staff {
        let subordinates = db.count_subordinates(user_id)?;
        if subordinates > 0 {
            return Err(AppError::invalid(
                "role",
                format!("user still supervises {} staff", subordinates),
            ));
        }
    }

    let hash = if input.password.is_empty() {
        None
    } else {
        Some(hash_password(&input.password)?)
    };
    let user = db.update_user(user_id, &profile, hash.as_deref())?;
    info!(
        actor = actor.id,
        user = user_id,
        role = %user.role,
        password_changed = hash.is_some(),
        "Updated user"
    );
    Ok(user)
}

/// Delete a user and everything they own. Admins cannot delete themselves.
pub fn delete_user(db: &Database, actor: &User, user_id: i64) -> AppResult<()> {
    gate(db, actor, Action::DeleteUser, Resource::User(user_id))?;
    db.delete_user(user_id)?;
    info!(actor = actor.id, user = user_id, "Deleted user");
    Ok(())
}

pub fn list_staff(db: &Database, actor: &User) -> AppResult<Vec<StaffEntry>> {
    authorize(actor, Action::ManageUsers, None)?;
    let users = db.list_users()?;
    let entries = users
        .iter()
        .map(|user| StaffEntry {
            supervisor_username: user.supervisor_id.and_then(|sid| {
                users
                    .iter()
                    .find(|u| u.id == sid)
                    .map(|u| u.username.clone())
            }),
            user: user.clone(),
        })
        .collect();
    Ok(entries)
}

pub fn staff_form(db: &Database, actor: &User, user_id: Option<i64>) -> AppResult<StaffForm> {
    authorize(actor, Action::ManageUsers, None)?;
    let user = match user_id {
        Some(id) => Some(
            db.get_user(id)?
                .ok_or_else(|| AppError::not_found(format!("user {}", id)))?,
        ),
        None => None,
    };

    let mut supervisors = db.list_users_by_role(Role::Supervisor)?;
    supervisors.extend(db.list_users_by_role(Role::Admin)?);
    supervisors.retain(|s| Some(s.id) != user_id);

    Ok(StaffForm {
        user,
        supervisors,
        roles: Role::ALL,
    })
}
