//! `GET /health`: liveness of the database, the embedded scheduler and the
//! task queue.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use resizer_db::models::status::TaskStatus;
use resizer_db::repositories::ImageTaskRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable or the embedded
    /// scheduler has stopped.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent when the scheduler runs in a separate process.
    pub scheduler: Option<SchedulerHealth>,
    /// Absent when the database is unreachable.
    pub tasks: Option<TaskCounts>,
}

#[derive(Debug, Serialize)]
pub struct SchedulerHealth {
    pub running: bool,
    pub interval_secs: u64,
}

/// Tasks not yet finished.
#[derive(Debug, Default, Serialize)]
pub struct TaskCounts {
    pub pending: i64,
    pub processing: i64,
}

async fn task_counts(state: &AppState) -> Option<TaskCounts> {
    let rows = match ImageTaskRepo::count_by_status(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "Task counts unavailable");
            return None;
        }
    };

    let mut counts = TaskCounts::default();
    for (status, count) in rows {
        match status {
            TaskStatus::Pending => counts.pending = count,
            TaskStatus::Processing => counts.processing = count,
            TaskStatus::Completed | TaskStatus::Failed => {}
        }
    }
    Some(counts)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = resizer_db::health_check(&state.pool).await.is_ok();

    let scheduler = state.scheduler.as_ref().map(|s| SchedulerHealth {
        running: s.is_running(),
        interval_secs: s.interval().as_secs(),
    });
    let tasks = if db_healthy { task_counts(&state).await } else { None };

    let scheduler_ok = scheduler.as_ref().map_or(true, |s| s.running);
    let status = if db_healthy && scheduler_ok { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        scheduler,
        tasks,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
