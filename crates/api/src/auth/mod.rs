//! Username/password accounts.
//!
//! - [`password`] -- Argon2id hashing and strength checks.
//!
//! Login only verifies credentials; no session or token is issued.

pub mod password;

use resizer_core::error::CoreError;
use resizer_db::models::user::User;
use resizer_db::repositories::UserRepo;
use resizer_db::DbPool;

use crate::error::AppResult;
use crate::handlers::run_blocking;

/// Message for every failed login, whichever part was wrong.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Create an account with a hashed password.
///
/// Fails with `InvalidInput` for an empty username or a short password and
/// with `Conflict` when the username is taken.
pub async fn create_user(pool: &DbPool, username: &str, plain: &str) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CoreError::InvalidInput("username must not be empty".into()).into());
    }
    password::check_strength(plain)?;

    let plain = plain.to_owned();
    let hash = run_blocking(move || password::hash_password(&plain)).await?;

    match UserRepo::create(pool, username, &hash).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "User created");
            Ok(user)
        }
        Err(e) if resizer_db::is_unique_violation(&e) => Err(CoreError::Conflict(format!(
            "username '{username}' is already taken"
        ))
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Check a username/password pair.
///
/// An unknown user and a wrong password fail the same way.
pub async fn authenticate(pool: &DbPool, username: &str, plain: &str) -> AppResult<User> {
    let unauthorized = || CoreError::Unauthorized(INVALID_CREDENTIALS.into());

    let Some(user) = UserRepo::find_by_username(pool, username.trim()).await? else {
        tracing::info!(%username, "Login rejected: unknown user");
        return Err(unauthorized().into());
    };

    let plain = plain.to_owned();
    let stored = user.password_hash.clone();
    let matches = run_blocking(move || password::verify_password(&plain, &stored)).await?;
    if !matches {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(unauthorized().into());
    }

    Ok(user)
}

/// Create the initial account unless one with that username already exists.
///
/// Returns whether a new account was created.
pub async fn seed_admin(pool: &DbPool, username: &str, plain: &str) -> AppResult<bool> {
    if UserRepo::find_by_username(pool, username.trim()).await?.is_some() {
        return Ok(false);
    }
    create_user(pool, username, plain).await?;
    Ok(true)
}
