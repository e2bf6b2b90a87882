//! The authorization gate.
//!
//! Every operation resolves the owner chain of whatever it touches and asks
//! [`authorize`] before reading or mutating. Nothing else in the crate makes
//! role or ownership decisions.
//!
//! Rules:
//! - Owners may read and write their own hierarchy and tasks.
//! - A reviewer (Supervisor or Admin) may read the hierarchy of a user whose
//!   supervisor they are; an Admin may read anyone's.
//! - Nobody writes another user's hierarchy, Admins included.
//! - Commenting needs a reviewer who is not the owner and who either
//!   supervises the owner or is an Admin.
//! - User management is Admin only, and an Admin cannot delete themself.

use crate::error::AppError;
use crate::types::{Role, User};
use tracing::warn;

/// Something an operation can target, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User(i64),
    Objective(i64),
    Outcome(i64),
    Activity(i64),
    Task(i64),
    Comment(i64),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::User(_) => "user",
            Resource::Objective(_) => "objective",
            Resource::Outcome(_) => "expected outcome",
            Resource::Activity(_) => "activity",
            Resource::Task(_) => "task",
            Resource::Comment(_) => "comment",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Resource::User(id)
            | Resource::Objective(id)
            | Resource::Outcome(id)
            | Resource::Activity(id)
            | Resource::Task(id)
            | Resource::Comment(id) => id,
        }
    }
}

/// The user a resource ultimately belongs to, and that user's supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerChain {
    pub owner_id: i64,
    pub owner_supervisor_id: Option<i64>,
}

impl OwnerChain {
    pub fn of(user: &User) -> Self {
        OwnerChain {
            owner_id: user.id,
            owner_supervisor_id: user.supervisor_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
    Comment,
    /// Open the reviewer views (supervisor dashboard, staff reports).
    Supervise,
    ManageUsers,
    DeleteUser,
}

fn allowed(actor: &User, action: Action, chain: Option<&OwnerChain>) -> bool {
    let is_admin = actor.role == Role::Admin;
    match (action, chain) {
        (Action::ManageUsers, _) => is_admin,
        (Action::Supervise, _) => actor.role.is_reviewer(),
        (Action::DeleteUser, Some(chain)) => is_admin && chain.owner_id != actor.id,
        (Action::Read, Some(chain)) => {
            chain.owner_id == actor.id
                || is_admin
                || (actor.role.is_reviewer() && chain.owner_supervisor_id == Some(actor.id))
        }
        (Action::Write, Some(chain)) => chain.owner_id == actor.id,
        (Action::Comment, Some(chain)) => {
            actor.role.is_reviewer()
                && chain.owner_id != actor.id
                && (is_admin || chain.owner_supervisor_id == Some(actor.id))
        }
        (_, None) => false,
    }
}

/// Decide whether `actor` may perform `action` on something owned as `chain`.
///
/// `chain` is `None` for operations with no single owner (creating a user,
/// listing all staff). Denials are logged and returned as `Forbidden`.
pub fn authorize(actor: &User, action: Action, chain: Option<&OwnerChain>) -> Result<(), AppError> {
    if allowed(actor, action, chain) {
        return Ok(());
    }
    warn!(
        actor = actor.id,
        role = %actor.role,
        ?action,
        owner = chain.map(|c| c.owner_id),
        "Access denied"
    );
    let reason = match action {
        Action::Read => "not permitted to view this record",
        Action::Write => "only the owner may change this record",
        Action::Comment => "only the owner's supervisor or an admin may comment",
        Action::Supervise => "supervisor or admin access required",
        Action::ManageUsers => "admin access required",
        Action::DeleteUser if chain.is_some_and(|c| c.owner_id == actor.id) => {
            "cannot delete your own account"
        }
        Action::DeleteUser => "admin access required",
    };
    Err(AppError::forbidden(reason))
}

/// Error for a target that did not resolve.
///
/// Only Admins learn that the id is missing; everyone else gets the same
/// `Forbidden` they would get for an existing record they cannot touch.
pub fn unresolved(actor: &User, resource: Resource) -> AppError {
    if actor.role == Role::Admin {
        AppError::not_found(format!("{} {}", resource.kind(), resource.id()))
    } else {
        warn!(actor = actor.id, ?resource, "Access denied to unresolved target");
        AppError::forbidden("not permitted to view this record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Role, supervisor_id: Option<i64>) -> User {
        User {
            id,
            username: format!("u{}", id),
            password_hash: String::new(),
            full_name: format!("User {}", id),
            email: String::new(),
            role,
            supervisor_id,
            department: String::new(),
            position: String::new(),
            created_at: 0,
        }
    }

    fn owned_by(owner: &User) -> OwnerChain {
        OwnerChain::of(owner)
    }

    #[test]
    fn owner_reads_and_writes() {
        let staff = user(3, Role::Staff, Some(2));
        let chain = owned_by(&staff);
        assert!(authorize(&staff, Action::Read, Some(&chain)).is_ok());
        assert!(authorize(&staff, Action::Write, Some(&chain)).is_ok());
    }

    #[test]
    fn other_staff_is_forbidden() {
        let owner = user(3, Role::Staff, Some(2));
        let other = user(4, Role::Staff, Some(2));
        let chain = owned_by(&owner);
        let err = authorize(&other, Action::Read, Some(&chain)).unwrap_err();
        assert!(err.is_forbidden());
        assert!(authorize(&other, Action::Write, Some(&chain)).is_err());
    }

    #[test]
    fn supervisor_reads_and_comments_but_never_writes() {
        let supervisor = user(2, Role::Supervisor, None);
        let chain = owned_by(&user(3, Role::Staff, Some(2)));
        assert!(authorize(&supervisor, Action::Read, Some(&chain)).is_ok());
        assert!(authorize(&supervisor, Action::Comment, Some(&chain)).is_ok());
        assert!(authorize(&supervisor, Action::Write, Some(&chain)).is_err());
    }

    #[test]
    fn unrelated_supervisor_is_forbidden() {
        let supervisor = user(5, Role::Supervisor, None);
        let chain = owned_by(&user(3, Role::Staff, Some(2)));
        assert!(authorize(&supervisor, Action::Read, Some(&chain)).is_err());
        assert!(authorize(&supervisor, Action::Comment, Some(&chain)).is_err());
    }

    #[test]
    fn admin_reads_and_comments_everywhere_but_does_not_write() {
        let admin = user(1, Role::Admin, None);
        let chain = owned_by(&user(3, Role::Staff, Some(2)));
        assert!(authorize(&admin, Action::Read, Some(&chain)).is_ok());
        assert!(authorize(&admin, Action::Comment, Some(&chain)).is_ok());
        assert!(authorize(&admin, Action::Write, Some(&chain)).is_err());
    }

    #[test]
    fn reviewers_cannot_comment_on_their_own_records() {
        let supervisor = user(2, Role::Supervisor, Some(1));
        let chain = owned_by(&supervisor);
        assert!(authorize(&supervisor, Action::Comment, Some(&chain)).is_err());
    }

    #[test]
    fn staff_never_comments() {
        let staff = user(3, Role::Staff, None);
        let chain = owned_by(&user(4, Role::Staff, Some(3)));
        assert!(authorize(&staff, Action::Comment, Some(&chain)).is_err());
        assert!(authorize(&staff, Action::Read, Some(&chain)).is_err());
    }

    #[test]
    fn reviewer_views_need_a_reviewer_role() {
        assert!(authorize(&user(2, Role::Supervisor, None), Action::Supervise, None).is_ok());
        assert!(authorize(&user(1, Role::Admin, None), Action::Supervise, None).is_ok());
        assert!(authorize(&user(3, Role::Staff, None), Action::Supervise, None).is_err());
    }

    #[test]
    fn user_management_is_admin_only() {
        let admin = user(1, Role::Admin, None);
        let supervisor = user(2, Role::Supervisor, None);
        assert!(authorize(&admin, Action::ManageUsers, None).is_ok());
        assert!(authorize(&supervisor, Action::ManageUsers, None).is_err());
    }

    #[test]
    fn admin_cannot_delete_self() {
        let admin = user(1, Role::Admin, None);
        let err = authorize(&admin, Action::DeleteUser, Some(&owned_by(&admin))).unwrap_err();
        assert_eq!(err.to_string(), "cannot delete your own account");
        let other = user(3, Role::Staff, None);
        assert!(authorize(&admin, Action::DeleteUser, Some(&owned_by(&other))).is_ok());
    }

    #[test]
    fn unresolved_targets_only_leak_to_admins() {
        let admin = user(1, Role::Admin, None);
        let staff = user(3, Role::Staff, None);
        assert!(unresolved(&admin, Resource::Objective(99)).is_not_found());
        assert!(unresolved(&staff, Resource::Objective(99)).is_forbidden());
    }
}
