//! HTTP-level integration tests for image tasks, including a full
//! upload → schedule → tick → fetch round through the real worker.

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::FixedOffset;
use common::{body_json, create_project, get, png_bytes, post_file, post_json};
use resizer_core::clock::ZonedClock;
use resizer_worker::{ImageWorker, Scheduler};
use sqlx::SqlitePool;

fn task_body(image_path: &str, scheduled_for: &str) -> serde_json::Value {
    serde_json::json!({
        "image_path": image_path,
        "target_width": 100,
        "target_height": 50,
        "scheduled_for": scheduled_for,
    })
}

async fn task_count(pool: &SqlitePool) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM image_tasks")
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_task_is_pending_in_scheduler_zone(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let project = create_project(&pool, dir.path(), "Tasks").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool, dir.path());
    let response = post_json(
        app,
        &format!("/api/v1/projects/{id}/tasks"),
        task_body("/photos/a.jpg", "2024-05-01T09:30:00+08:00"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["project_id"], id);
    assert_eq!(json["image_path"], "/photos/a.jpg");
    assert_eq!(json["target_width"], 100);
    assert_eq!(json["target_height"], 50);
    assert_eq!(json["status"], "pending");
    // The test server schedules in UTC.
    assert_eq!(json["scheduled_for"], "2024-05-01T01:30:00");
    assert!(json["created_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_timestamp_returns_400_and_persists_nothing(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let project = create_project(&pool, dir.path(), "Bad Time").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone(), dir.path());
    let response = post_json(
        app,
        &format!("/api/v1/projects/{id}/tasks"),
        task_body("/photos/a.jpg", "next tuesday"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
    assert_eq!(task_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_for_unknown_project_returns_404(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let response = post_json(
        app,
        "/api/v1/projects/777/tasks",
        task_body("/photos/a.jpg", "2024-05-01T09:30:00Z"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(task_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_tasks_newest_first(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let project = create_project(&pool, dir.path(), "Listing").await;
    let id = project["id"].as_i64().unwrap();

    let mut created = Vec::new();
    for name in ["first.jpg", "second.jpg"] {
        let app = common::build_test_app(pool.clone(), dir.path());
        let response = post_json(
            app,
            &format!("/api/v1/projects/{id}/tasks"),
            task_body(&format!("/photos/{name}"), "2030-01-01T00:00:00Z"),
        )
        .await;
        created.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let app = common::build_test_app(pool, dir.path());
    let response = get(app, &format!("/api/v1/projects/{id}/tasks")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let ids: Vec<_> = body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![created[1], created[0]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_tasks_for_unknown_project_returns_404(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = get(app, "/api/v1/projects/31337/tasks").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uploaded_image_is_resized_by_scheduler(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let project = create_project(&pool, dir.path(), "Round Trip").await;
    let id = project["id"].as_i64().unwrap();
    let location = PathBuf::from(project["location"].as_str().unwrap());

    // Upload.
    let app = common::build_test_app(pool.clone(), dir.path());
    let response = post_file(
        app,
        &format!("/api/v1/projects/{id}/uploads"),
        "file",
        "photo.png",
        &png_bytes(40, 20),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded = body_json(response).await;
    let image_path = uploaded["data"]["path"].as_str().unwrap().to_string();
    assert!(PathBuf::from(&image_path).starts_with(location.join("uploads")));

    // Schedule in the past so it is due immediately.
    let app = common::build_test_app(pool.clone(), dir.path());
    let response = post_json(
        app,
        &format!("/api/v1/projects/{id}/tasks"),
        task_body(&image_path, "2020-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task_id = body_json(response).await["id"].as_i64().unwrap();

    // Nothing resized yet.
    let app = common::build_test_app(pool.clone(), dir.path());
    let uri = format!("/api/v1/images/resized?path={image_path}");
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);

    let scheduler = Scheduler::new(
        pool.clone(),
        Arc::new(ImageWorker::new(pool.clone())),
        Arc::new(ZonedClock::new(FixedOffset::east_opt(0).unwrap())),
        Duration::from_secs(5),
    );
    let report = scheduler.tick().await.unwrap();
    assert_eq!((report.found, report.completed), (1, 1));

    let app = common::build_test_app(pool.clone(), dir.path());
    let tasks = body_json(get(app, &format!("/api/v1/projects/{id}/tasks")).await).await;
    assert_eq!(tasks[0]["id"], task_id);
    assert_eq!(tasks[0]["status"], "completed");

    let app = common::build_test_app(pool, dir.path());
    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let bytes = STANDARD
        .decode(json["data"]["content"].as_str().unwrap())
        .unwrap();
    let resized = image::load_from_memory(&bytes).unwrap();
    assert_eq!((resized.width(), resized.height()), (100, 50));
}
