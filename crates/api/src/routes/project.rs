//! Route definitions for the `/projects` resource.
//!
//! Also nests image tasks and uploads under `/projects/{project_id}/...`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::upload::MAX_UPLOAD_BYTES;
use crate::handlers::{image_task, project, upload};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{project_id}/tasks                -> list_by_project
/// POST   /{project_id}/tasks                -> create
///
/// POST   /{project_id}/uploads              -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    let task_routes = Router::new().route(
        "/",
        get(image_task::list_by_project).post(image_task::create),
    );

    let upload_routes = Router::new()
        .route("/", post(upload::upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/tasks", task_routes)
        .nest("/{project_id}/uploads", upload_routes)
}
