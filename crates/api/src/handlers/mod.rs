pub mod auth;
pub mod image;
pub mod image_task;
pub mod project;
pub mod upload;

use resizer_core::error::CoreError;

use crate::error::{AppError, AppResult};

/// Run filesystem or codec work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalError(format!("blocking task failed: {e}")))?
        .map_err(AppError::from)
}
