pub mod auth;
pub mod health;
pub mod image;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              verify username + password
///
/// /projects                                list, create
/// /projects/{id}                           get, update, delete
/// /projects/{project_id}/tasks             list, create
/// /projects/{project_id}/uploads           upload source image (multipart)
///
/// /images?path=                            original image (base64)
/// /images/resized?path=                    resized output (base64)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/images", image::router())
}
