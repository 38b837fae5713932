//! Repository for the `users` table.

use crate::models::user::User;
use crate::DbPool;

const COLUMNS: &str = "id, username, password";

/// Provides lookups and inserts for login accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user. `password_hash` must already be hashed.
    ///
    /// A taken username surfaces as a unique-constraint violation.
    pub async fn create(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}
