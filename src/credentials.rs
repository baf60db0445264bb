//! Password hashing and verification (Argon2id).
//!
//! [`hash`] produces a salted PHC string (`$argon2id$v=19$...`) that is stored in
//! the `users.password` column. [`verify`] parses that string and checks a
//! candidate password with a constant-time comparison.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hash used when the account does not exist, so a failed lookup costs the
/// same as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash("frontdesk-dummy-password").ok());

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if Argon2 rejects the input or parameters.
pub fn hash(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(CredentialError::Hash)
}

/// Check a plaintext password against a stored PHC hash.
///
/// A stored value that is not a valid PHC string never verifies.
#[must_use]
pub fn verify(plaintext: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Stored password hash is malformed: {e}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Compute the dummy hash now rather than inside the first unknown-email login.
pub fn prepare() {
    if Lazy::force(&DUMMY_HASH).is_none() {
        error!("Failed to compute the dummy password hash");
    }
}

/// Burn one verification worth of work for an unknown account.
pub fn verify_dummy(plaintext: &str) {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify(plaintext, dummy);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_plaintext() {
        let stored = hash("secret1").unwrap();
        assert_ne!(stored, "secret1");
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("secret1"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash("pw").unwrap();
        let second = hash("pw").unwrap();
        assert_ne!(first, second);
        assert!(verify("pw", &first));
        assert!(verify("pw", &second));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let stored = hash("secret1").unwrap();
        assert!(!verify("wrong", &stored));
        assert!(!verify("", &stored));
        assert!(!verify("secret1 ", &stored));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify("secret1", "secret1"));
        assert!(!verify("secret1", ""));
        assert!(!verify("secret1", "$argon2id$garbage"));
    }

    #[test]
    fn prepare_computes_dummy_hash() {
        prepare();
        assert!(Lazy::get(&DUMMY_HASH).is_some_and(Option::is_some));
    }

    #[test]
    fn dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
        verify_dummy("anything");
    }
}
