//! Read access to stored images, returned base64-encoded.
//!
//! Only files under the projects directory are served.

use std::path::{Path, PathBuf};

use axum::extract::{Query, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use resizer_core::error::CoreError;
use resizer_core::output_path::resized_path_for;
use resizer_core::project_dirs::ProjectDirectories;
use serde::{Deserialize, Serialize};

use super::run_blocking;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImagePathParams {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    pub path: String,
    /// Standard base64 of the file bytes.
    pub content: String,
}

/// GET /api/v1/images?path=...
pub async fn get_original(
    State(state): State<AppState>,
    Query(params): Query<ImagePathParams>,
) -> AppResult<Json<DataResponse<ImageContent>>> {
    let path = PathBuf::from(&params.path);
    read_image(&state, path).await
}

/// GET /api/v1/images/resized?path=...
///
/// `path` is the source image; the derived output of a completed task is
/// returned.
pub async fn get_resized(
    State(state): State<AppState>,
    Query(params): Query<ImagePathParams>,
) -> AppResult<Json<DataResponse<ImageContent>>> {
    let path = resized_path_for(Path::new(&params.path))?;
    read_image(&state, path).await
}

async fn read_image(state: &AppState, path: PathBuf) -> AppResult<Json<DataResponse<ImageContent>>> {
    let dirs = state.project_dirs.clone();
    let requested = path.display().to_string();

    let (resolved, bytes) = run_blocking(move || read_within(&dirs, &path))
        .await
        .map_err(|e| match e {
            AppError::Core(CoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                AppError::NotFound(format!("image '{requested}' not found"))
            }
            other => other,
        })?;

    Ok(Json(DataResponse {
        data: ImageContent {
            path: resolved.to_string_lossy().into_owned(),
            content: STANDARD.encode(bytes),
        },
    }))
}

fn read_within(dirs: &ProjectDirectories, path: &Path) -> Result<(PathBuf, Vec<u8>), CoreError> {
    let resolved = dirs.resolve_within(path)?;
    let bytes = std::fs::read(&resolved)
        .map_err(|e| CoreError::io(format!("read {}", resolved.display()), e))?;
    Ok((resolved, bytes))
}
