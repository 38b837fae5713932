//! Handlers for image tasks, nested under `/projects/{project_id}/tasks`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use resizer_core::error::CoreError;
use resizer_core::types::DbId;
use resizer_db::models::image_task::{CreateImageTask, ImageTask, NewImageTask};
use resizer_db::repositories::{ImageTaskRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/tasks
///
/// `scheduled_for` must be RFC 3339; it is stored as wall-clock time in
/// the scheduler's zone. Dimensions and the image path are checked only
/// when the task runs.
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateImageTask>,
) -> AppResult<(StatusCode, Json<ImageTask>)> {
    let scheduled_for = state.clock.parse_rfc3339(&input.scheduled_for)?;

    let new_task = NewImageTask {
        project_id,
        image_path: input.image_path,
        target_width: input.target_width,
        target_height: input.target_height,
        scheduled_for,
    };

    let task = ImageTaskRepo::create(&state.pool, &new_task, state.clock.now())
        .await
        .map_err(|e| {
            if resizer_db::is_foreign_key_violation(&e) {
                AppError::Core(CoreError::NotFound {
                    entity: "Project",
                    id: project_id,
                })
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(
        task_id = task.id,
        project_id,
        scheduled_for = %task.scheduled_for,
        "Image task scheduled"
    );
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/projects/{project_id}/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ImageTask>>> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let tasks = ImageTaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(tasks))
}
