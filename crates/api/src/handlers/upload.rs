//! Upload of source images into a project's directory.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use resizer_core::error::CoreError;
use resizer_core::types::DbId;
use resizer_db::repositories::ProjectRepo;
use serde::Serialize;

use super::run_blocking;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    /// Absolute path of the stored file; use it as a task's `image_path`.
    pub path: String,
    pub size_bytes: usize,
}

/// POST /api/v1/projects/{project_id}/uploads
///
/// Accepts a multipart form with a required `file` field.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedImage>>)> {
    let project = ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((file_name, data.to_vec()));
    }

    let (file_name, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let size_bytes = data.len();

    let dirs = state.project_dirs.clone();
    let location = PathBuf::from(&project.location);
    let stored =
        run_blocking(move || dirs.save_upload(&location, project_id, &file_name, &data)).await?;

    tracing::info!(
        project_id,
        path = %stored.display(),
        size_bytes,
        "Image uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadedImage {
                path: stored.to_string_lossy().into_owned(),
                size_bytes,
            },
        }),
    ))
}
