//! Route definitions for `/images`.

use axum::routing::get;
use axum::Router;

use crate::handlers::image;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// GET /?path=          -> get_original
/// GET /resized?path=   -> get_resized
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(image::get_original))
        .route("/resized", get(image::get_resized))
}
