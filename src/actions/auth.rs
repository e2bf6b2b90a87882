//! Login, logout and self-registration.

use super::staff::{UserInput, provision_user};
use crate::db::{Database, now_ms};
use crate::error::{AppError, AppResult};
use crate::password::verify_or_dummy;
use crate::types::{Role, User};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

const HOUR_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Self-registration. Always creates a Staff account with no supervisor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to the username when left empty.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_at: i64,
}

/// Session lifetime in milliseconds, saturating instead of wrapping.
fn ttl_ms(ttl_hours: u64) -> i64 {
    i64::try_from(ttl_hours)
        .unwrap_or(i64::MAX)
        .saturating_mul(HOUR_MS)
}

fn start_session(db: &Database, user: User, ttl_hours: u64) -> AppResult<Session> {
    let now = now_ms();
    let expires_at = now.saturating_add(ttl_ms(ttl_hours));
    let token = Uuid::new_v4().to_string();
    db.create_session(&token, user.id, now, expires_at)?;
    Ok(Session {
        token,
        user,
        expires_at,
    })
}

/// Verify credentials and open a session.
///
/// Unknown usernames and wrong passwords fail identically.
pub fn login(db: &Database, input: &LoginInput, ttl_hours: u64) -> AppResult<Session> {
    let username = input.username.trim();
    let user = db.get_user_by_username(username)?;
    let verified = verify_or_dummy(
        &input.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    );
    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!(username = %username, "Failed login");
            return Err(AppError::InvalidCredentials);
        }
    };
    let session = start_session(db, user, ttl_hours)?;
    info!(user = session.user.id, "Logged in");
    Ok(session)
}

pub fn logout(db: &Database, token: &str) -> AppResult<()> {
    db.delete_session(token)?;
    info!("Logged out");
    Ok(())
}

/// The user behind a session token, if it is still live.
pub fn resolve_session(db: &Database, token: &str) -> AppResult<Option<User>> {
    Ok(db.user_for_session(token, now_ms())?)
}

/// Register a Staff account and log it in.
pub fn register(db: &Database, input: &RegisterInput, ttl_hours: u64) -> AppResult<Session> {
    let full_name = if input.full_name.trim().is_empty() {
        input.username.clone()
    } else {
        input.full_name.clone()
    };
    let user = provision_user(
        db,
        &UserInput {
            username: input.username.clone(),
            password: input.password.clone(),
            full_name,
            email: input.email.clone(),
            role: Role::Staff.to_string(),
            supervisor_id: None,
            department: input.department.clone(),
            position: input.position.clone(),
        },
    )?;
    start_session(db, user, ttl_hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().expect("Failed to create in-memory database")
    }

    fn register_amy(db: &Database) -> Session {
        register(
            db,
            &RegisterInput {
                username: "amy".to_string(),
                password: "secret".to_string(),
                ..Default::default()
            },
            1,
        )
        .unwrap()
    }

    fn login_as(db: &Database, username: &str, password: &str, ttl_hours: u64) -> AppResult<Session> {
        login(
            db,
            &LoginInput {
                username: username.to_string(),
                password: password.to_string(),
            },
            ttl_hours,
        )
    }

    #[test]
    fn unknown_user_and_wrong_password_fail_alike() {
        let db = setup_db();
        register_amy(&db);

        let unknown = login_as(&db, "nobody", "secret", 1).unwrap_err();
        let wrong = login_as(&db, "amy", "wrong", 1).unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn login_resolves_to_the_user() {
        let db = setup_db();
        let registered = register_amy(&db);
        assert_eq!(registered.user.full_name, "amy");

        let session = login_as(&db, " amy ", "secret", 1).unwrap();
        let resolved = resolve_session(&db, &session.token).unwrap().unwrap();
        assert_eq!(resolved.id, registered.user.id);

        logout(&db, &session.token).unwrap();
        assert!(resolve_session(&db, &session.token).unwrap().is_none());
    }

    #[test]
    fn huge_ttl_saturates_instead_of_expiring() {
        assert_eq!(ttl_ms(2), 2 * HOUR_MS);
        assert_eq!(ttl_ms(u64::MAX), i64::MAX);

        let db = setup_db();
        register_amy(&db);
        let session = login_as(&db, "amy", "secret", u64::MAX).unwrap();
        assert_eq!(session.expires_at, i64::MAX);
        assert!(resolve_session(&db, &session.token).unwrap().is_some());
    }
}
