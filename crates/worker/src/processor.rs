//! Image worker: runs the resize pipeline for one task and keeps the
//! task's status in step with it.
//!
//! Status is written to `processing` before any file is touched, so a crash
//! mid-run leaves the task visibly `processing` rather than `pending`.
//! Every failure after that point records `failed` before returning.

use std::path::PathBuf;

use async_trait::async_trait;
use resizer_core::error::CoreError;
use resizer_core::imaging;
use resizer_db::models::image_task::ImageTask;
use resizer_db::models::status::TaskStatus;
use resizer_db::repositories::ImageTaskRepo;
use resizer_db::DbPool;

use crate::error::WorkerError;

/// Something that can run a single ready task to completion.
///
/// The scheduler only talks to this trait; [`ImageWorker`] is the
/// production implementation.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Process `task`, returning the path of the produced artifact.
    async fn process(&self, task: &ImageTask) -> Result<PathBuf, WorkerError>;
}

/// Decodes, resizes and re-encodes task images, recording status in the
/// task store.
#[derive(Clone)]
pub struct ImageWorker {
    pool: DbPool,
}

impl ImageWorker {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run one task through the pipeline.
    ///
    /// On success the task is `completed` and the output path is returned.
    /// On failure the task is `failed` and the cause is returned; if that
    /// status write itself fails the error is
    /// [`WorkerError::StatusNotRecorded`].
    pub async fn process(&self, task: &ImageTask) -> Result<PathBuf, WorkerError> {
        let task_id = task.id;

        if !task.status.can_transition(TaskStatus::Processing) {
            return Err(CoreError::Conflict(format!(
                "task {task_id} is {} and cannot be processed",
                task.status
            ))
            .into());
        }

        ImageTaskRepo::set_status(&self.pool, task_id, TaskStatus::Processing).await?;
        tracing::info!(
            task_id,
            image_path = %task.image_path,
            target_width = task.target_width,
            target_height = task.target_height,
            "Processing image task"
        );

        match Self::transform(task).await {
            Ok(output) => {
                if let Err(e) =
                    ImageTaskRepo::set_status(&self.pool, task_id, TaskStatus::Completed).await
                {
                    tracing::error!(
                        task_id,
                        output = %output.display(),
                        error = %e,
                        "Resized image written but completion not recorded"
                    );
                    return Err(e.into());
                }
                tracing::info!(task_id, output = %output.display(), "Image task completed");
                Ok(output)
            }
            Err(cause) => {
                if let Err(e) =
                    ImageTaskRepo::set_status(&self.pool, task_id, TaskStatus::Failed).await
                {
                    tracing::error!(
                        task_id,
                        cause = %cause,
                        error = %e,
                        "Failed to record task failure"
                    );
                    return Err(WorkerError::StatusNotRecorded {
                        cause,
                        status: TaskStatus::Failed,
                        source: e,
                    });
                }
                tracing::warn!(task_id, error = %cause, "Image task failed");
                Err(cause.into())
            }
        }
    }

    /// Decode / resize / encode on a blocking thread.
    async fn transform(task: &ImageTask) -> Result<PathBuf, CoreError> {
        let source = PathBuf::from(&task.image_path);
        let (width, height) = (task.target_width, task.target_height);

        tokio::task::spawn_blocking(move || imaging::resize_file(&source, width, height))
            .await
            .map_err(|e| CoreError::Internal(format!("resize task did not finish: {e}")))?
    }
}

#[async_trait]
impl TaskProcessor for ImageWorker {
    async fn process(&self, task: &ImageTask) -> Result<PathBuf, WorkerError> {
        ImageWorker::process(self, task).await
    }
}
