//! First-run Admin seeding.

use super::staff::{UserInput, provision_user};
use crate::config::BootstrapConfig;
use crate::db::Database;
use crate::error::AppResult;
use crate::types::{Role, User};
use tracing::{info, warn};

/// Create the configured Admin if seeding is enabled and no Admin exists yet.
///
/// Returns the new account, or `None` when nothing was seeded.
pub fn seed_admin(db: &Database, config: &BootstrapConfig) -> AppResult<Option<User>> {
    if !config.enabled {
        return Ok(None);
    }
    if db.count_users_with_role(Role::Admin)? > 0 {
        return Ok(None);
    }
    let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) else {
        warn!(
            "No admin account exists and no bootstrap password is configured; \
             set STAFF_PERF_ADMIN_PASSWORD or use 'create-user'"
        );
        return Ok(None);
    };

    let user = provision_user(
        db,
        &UserInput {
            username: config.username.clone(),
            password: password.to_string(),
            full_name: config.full_name.clone(),
            email: config.email.clone(),
            role: Role::Admin.to_string(),
            ..Default::default()
        },
    )?;
    info!(user = user.id, username = %user.username, "Seeded bootstrap admin");
    Ok(Some(user))
}
