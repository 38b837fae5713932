//! Application router: routes plus the HTTP middleware stack.
//!
//! The binary and the integration tests both call [`build_app_router`], so
//! tests exercise the production middleware.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Routes, then middleware. Outermost first, a request passes through:
///
/// ```text
/// cors -> set x-request-id -> trace -> propagate x-request-id
///      -> timeout (408) -> catch panic (500) -> handler
/// ```
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state);

    routes
        .layer(CatchPanicLayer::new())
        .layer(request_timeout(config.request_timeout_secs))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(build_cors_layer(config))
}

/// Requests running longer than `secs` are answered with 408.
fn request_timeout(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}

/// CORS for the configured front-end origins.
///
/// The API is cookie-less and JSON-only, so credentials are not allowed and
/// `Content-Type` is the only request header needed. Panics at startup on an
/// unparsable origin.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([REQUEST_ID])
        .max_age(Duration::from_secs(3600))
}
