//! Handlers for the `/projects` resource.
//!
//! A project owns a directory under the projects base dir. The directory is
//! created before the row is inserted and removed after the row is deleted.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use resizer_core::error::CoreError;
use resizer_core::types::DbId;
use resizer_db::models::project::{CreateProject, Project, UpdateProject};
use resizer_db::repositories::ProjectRepo;

use super::run_blocking;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn require_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidInput("project name must not be empty".into()).into());
    }
    Ok(())
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    require_name(&input.name)?;

    let dirs = state.project_dirs.clone();
    let name = input.name.clone();
    let location = run_blocking(move || dirs.create(&name)).await?;

    let created = ProjectRepo::create(
        &state.pool,
        &input,
        &location.to_string_lossy(),
        state.clock.now(),
    )
    .await;

    match created {
        Ok(project) => {
            tracing::info!(
                project_id = project.id,
                location = %project.location,
                "Project created"
            );
            Ok((StatusCode::CREATED, Json(project)))
        }
        Err(e) => {
            // The directory is brand new and empty; don't leave it behind.
            let dirs = state.project_dirs.clone();
            let orphan = location.clone();
            if let Err(cleanup) = run_blocking(move || dirs.remove(&orphan)).await {
                tracing::warn!(
                    location = %location.display(),
                    error = %cleanup,
                    "Failed to remove directory of unsaved project"
                );
            }
            Err(e.into())
        }
    }
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    if let Some(name) = &input.name {
        require_name(name)?;
    }
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Tasks and the project row go in one transaction. The directory is
/// removed afterwards; if that fails the rows stay deleted, the path is
/// logged and the request fails with 500.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ProjectRepo::delete_cascade(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        tasks_deleted = deleted.tasks_deleted,
        "Project rows deleted"
    );

    let dirs = state.project_dirs.clone();
    let location = PathBuf::from(&deleted.location);
    if let Err(e) = run_blocking(move || dirs.remove(&location)).await {
        tracing::error!(
            project_id = id,
            orphaned_location = %deleted.location,
            error = %e,
            "Project deleted but its directory could not be removed"
        );
        return Err(e);
    }

    Ok(StatusCode::NO_CONTENT)
}
