//! Repository for the `projects` table.

use resizer_core::types::{DbId, LocalTimestamp};

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, creation_time, location";

/// Outcome of [`ProjectRepo::delete_cascade`].
#[derive(Debug, Clone)]
pub struct DeletedProject {
    /// Directory the project owned. Still on disk when this is returned.
    pub location: String,
    pub tasks_deleted: u64,
}

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project whose directory already exists at `location`.
    pub async fn create(
        pool: &DbPool,
        input: &CreateProject,
        location: &str,
        creation_time: LocalTimestamp,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, creation_time, location)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(creation_time)
            .bind(location)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects, most recently created first.
    pub async fn list(pool: &DbPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY creation_time DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Update name and/or description. The location never changes.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and all of its image tasks in one transaction.
    ///
    /// Only the database rows are removed. The caller removes the returned
    /// location afterwards; a crash in between leaves an orphaned directory.
    /// Returns `None` (and changes nothing) when the project does not exist.
    pub async fn delete_cascade(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<DeletedProject>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let location: Option<String> =
            sqlx::query_scalar("SELECT location FROM projects WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(location) = location else {
            return Ok(None);
        };

        let tasks = sqlx::query("DELETE FROM image_tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(DeletedProject {
            location,
            tasks_deleted: tasks.rows_affected(),
        }))
    }
}
