//! Image task entity model and DTOs.

use resizer_core::types::{DbId, LocalTimestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::TaskStatus;

/// A row from the `image_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageTask {
    pub id: DbId,
    pub project_id: DbId,
    pub image_path: String,
    pub target_width: i64,
    pub target_height: i64,
    pub status: TaskStatus,
    pub created_at: LocalTimestamp,
    pub scheduled_for: LocalTimestamp,
}

/// Store-level input for a new task. Always inserted as `pending`.
#[derive(Debug, Clone)]
pub struct NewImageTask {
    pub project_id: DbId,
    pub image_path: String,
    pub target_width: i64,
    pub target_height: i64,
    pub scheduled_for: LocalTimestamp,
}

/// Request body for `POST /api/v1/projects/{id}/tasks`.
///
/// `scheduled_for` is an RFC 3339 string; it is converted into the
/// scheduler's zone before it reaches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImageTask {
    pub image_path: String,
    pub target_width: i64,
    pub target_height: i64,
    pub scheduled_for: String,
}
