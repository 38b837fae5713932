#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::FixedOffset;
use http_body_util::BodyExt;
use resizer_core::project_dirs::ProjectDirectories;
use resizer_worker::{Scheduler, SchedulerConfig};
use sqlx::SqlitePool;
use tower::ServiceExt;

use resizer_api::config::ServerConfig;
use resizer_api::router::build_app_router;
use resizer_api::state::AppState;

const MULTIPART_BOUNDARY: &str = "resizer-test-boundary";

/// Build a test `ServerConfig` rooted at `projects_dir`. Timestamps are
/// interpreted in UTC.
pub fn test_config(projects_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        projects_dir: projects_dir.to_path_buf(),
        embedded_scheduler: false,
        scheduler: SchedulerConfig {
            interval_secs: 5,
            utc_offset: Some(FixedOffset::east_opt(0).unwrap()),
        },
        admin_username: "admin".to_string(),
        admin_password: "admin123".to_string(),
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: SqlitePool, projects_dir: &Path) -> Router {
    build_test_app_with_scheduler(pool, projects_dir, None)
}

/// Like [`build_test_app`], with an embedded scheduler visible to handlers.
pub fn build_test_app_with_scheduler(
    pool: SqlitePool,
    projects_dir: &Path,
    scheduler: Option<Arc<Scheduler>>,
) -> Router {
    let config = test_config(projects_dir);
    let state = AppState {
        pool,
        project_dirs: Arc::new(ProjectDirectories::new(projects_dir)),
        clock: Arc::new(config.scheduler.clock()),
        scheduler,
    };
    build_app_router(state, &config)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

/// POST a single-file multipart form with the file in field `field`.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    data: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Create a project through the API and return its JSON.
pub async fn create_project(pool: &SqlitePool, projects_dir: &Path, name: &str) -> serde_json::Value {
    let app = build_test_app(pool.clone(), projects_dir);
    let response = post_json(app, "/api/v1/projects", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Encode a small PNG in memory.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 200])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
