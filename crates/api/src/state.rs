use std::sync::Arc;

use resizer_core::clock::Clock;
use resizer_core::project_dirs::ProjectDirectories;
use resizer_worker::Scheduler;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: resizer_db::DbPool,
    /// Owner of the projects base directory.
    pub project_dirs: Arc<ProjectDirectories>,
    /// Wall clock in the scheduling zone. Timestamps written by handlers
    /// come from here so they compare correctly with the scheduler's "now".
    pub clock: Arc<dyn Clock>,
    /// The in-process scheduler, when this server runs one.
    pub scheduler: Option<Arc<Scheduler>>,
}
