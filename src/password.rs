//! Credential hashing.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;
use tracing::warn;

// Verified against when there is no stored hash, so an unknown username
// costs the same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Check a password against an optional stored hash.
///
/// With no stored hash the password is still run through a fixed hash and
/// the result is always false.
pub fn verify_or_dummy(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => verify_password(password, stored),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_stored_value_never_verifies() {
        assert!(!verify_password("admin123", "admin123"));
    }

    #[test]
    fn missing_hash_runs_a_real_verification() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash is built");
        assert!(PasswordHash::new(dummy).is_ok());
        assert!(dummy.starts_with("$argon2"));

        assert!(!verify_or_dummy("no account has this password", None));
        assert!(!verify_or_dummy("anything", None));
    }

    #[test]
    fn stored_hash_is_used_when_present() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_or_dummy("secret", Some(&hash)));
        assert!(!verify_or_dummy("wrong", Some(&hash)));
    }
}
