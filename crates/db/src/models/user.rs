//! Login account row.

use resizer_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// The stored column is `password`; it always holds an Argon2 PHC string and
/// is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: String,
}
