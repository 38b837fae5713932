//! Project entity model and DTOs.

use resizer_core::types::{DbId, LocalTimestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub creation_time: LocalTimestamp,
    /// Absolute path of the directory owned by this project.
    pub location: String,
}

/// DTO for creating a new project. The location is provisioned by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}
