use resizer_core::error::CoreError;
use resizer_db::models::status::TaskStatus;

/// Failure of a single task run.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The task could not be processed (I/O, codec, input or state error).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing the task store failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Processing failed and the follow-up status write failed too, so the
    /// stored status is stale.
    #[error("{cause}; recording status '{status}' also failed: {source}")]
    StatusNotRecorded {
        cause: CoreError,
        status: TaskStatus,
        #[source]
        source: sqlx::Error,
    },
}
