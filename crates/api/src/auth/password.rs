//! Argon2id hashing for stored account passwords.
//!
//! Hashes are PHC strings, so the salt and parameters travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use resizer_core::error::CoreError;

/// Shortest password accepted for a new account.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; an unreadable stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| CoreError::Internal(format!("stored password hash is malformed: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!("password check failed: {e}"))),
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn check_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}
