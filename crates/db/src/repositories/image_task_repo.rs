//! Repository for the `image_tasks` table.
//!
//! Status values always go through [`TaskStatus`]; there are no string
//! literals for statuses in the queries.

use resizer_core::types::{DbId, LocalTimestamp};

use crate::models::image_task::{ImageTask, NewImageTask};
use crate::models::status::TaskStatus;
use crate::DbPool;

/// Column list for `image_tasks` queries.
const COLUMNS: &str = "\
    id, project_id, image_path, target_width, target_height, \
    status, created_at, scheduled_for";

/// Second-precision text form of "now" used in the ready-task predicate.
const QUERY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Provides the task queue operations.
pub struct ImageTaskRepo;

impl ImageTaskRepo {
    /// Insert a new `pending` task.
    ///
    /// A `project_id` with no matching project fails with a foreign-key
    /// violation (see [`crate::is_foreign_key_violation`]).
    pub async fn create(
        pool: &DbPool,
        input: &NewImageTask,
        created_at: LocalTimestamp,
    ) -> Result<ImageTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO image_tasks \
                 (project_id, image_path, target_width, target_height, status, created_at, scheduled_for) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageTask>(&query)
            .bind(input.project_id)
            .bind(&input.image_path)
            .bind(input.target_width)
            .bind(input.target_height)
            .bind(TaskStatus::Pending)
            .bind(created_at)
            .bind(input.scheduled_for)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<ImageTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_tasks WHERE id = $1");
        sqlx::query_as::<_, ImageTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tasks of a project, most recently created first.
    pub async fn list_by_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<ImageTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_tasks \
             WHERE project_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ImageTask>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Pending tasks that are due at `now`, earliest `scheduled_for` first.
    ///
    /// SQLite compares at second precision against the text form of `now`.
    /// Each row is then checked again with a typed comparison and skipped
    /// if it is not yet due, so sub-second differences never run a task
    /// early.
    pub async fn ready_tasks(
        pool: &DbPool,
        now: LocalTimestamp,
    ) -> Result<Vec<ImageTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_tasks \
             WHERE status = $1 AND datetime(scheduled_for) <= datetime($2) \
             ORDER BY scheduled_for ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ImageTask>(&query)
            .bind(TaskStatus::Pending)
            .bind(now.format(QUERY_TIME_FORMAT).to_string())
            .fetch_all(pool)
            .await?;

        let ready: Vec<ImageTask> = rows
            .into_iter()
            .filter(|task| {
                let due = task.scheduled_for <= now;
                if !due {
                    tracing::debug!(
                        task_id = task.id,
                        scheduled_for = %task.scheduled_for,
                        %now,
                        "Skipping task not yet due"
                    );
                }
                due
            })
            .collect();

        Ok(ready)
    }

    /// Overwrite the status of a task. No version check is made.
    pub async fn set_status(
        pool: &DbPool,
        task_id: DbId,
        status: TaskStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE image_tasks SET status = $2 WHERE id = $1")
            .bind(task_id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of tasks in each status. Statuses with no tasks are omitted.
    pub async fn count_by_status(pool: &DbPool) -> Result<Vec<(TaskStatus, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM image_tasks GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
