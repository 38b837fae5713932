//! Integration tests for the polling scheduler.

mod common;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use resizer_db::models::image_task::ImageTask;
use resizer_db::models::status::TaskStatus;
use resizer_worker::{ImageWorker, Scheduler, TaskProcessor, TickReport, WorkerError};
use sqlx::SqlitePool;
use tokio::sync::Notify;

use common::{at, new_project, new_task, reload, write_upload, TestClock};

fn scheduler_with(pool: &SqlitePool, clock: Arc<TestClock>, interval: StdDuration) -> Scheduler {
    let worker = Arc::new(ImageWorker::new(pool.clone()));
    Scheduler::new(pool.clone(), worker, clock, interval)
}

/// Blocks inside `process` until released.
struct GatedProcessor {
    started: Notify,
    release: Notify,
    finished: AtomicBool,
    calls: AtomicUsize,
}

impl GatedProcessor {
    fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            finished: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TaskProcessor for GatedProcessor {
    async fn process(&self, task: &ImageTask) -> Result<PathBuf, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(PathBuf::from(&task.image_path))
    }
}

// ---------------------------------------------------------------------------
// Single ticks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tick_runs_task_scheduled_now(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "now").await;
    let source = write_upload(&location, "a.jpg", 40, 30);
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let task = new_task(&pool, project_id, &source, at(9, 0, 0)).await;

    let scheduler = scheduler_with(&pool, clock, StdDuration::from_secs(5));
    let report = scheduler.tick().await.unwrap();

    assert_eq!(
        report,
        TickReport {
            found: 1,
            completed: 1,
            failed: 0
        }
    );
    assert_eq!(reload(&pool, task.id).await.status, TaskStatus::Completed);
    let output = location.join("resized").join("a.jpg");
    assert_eq!(image::image_dimensions(&output).unwrap(), (100, 50));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_future_task_waits_for_its_time(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "later").await;
    let source = write_upload(&location, "a.png", 20, 20);
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let task = new_task(&pool, project_id, &source, at(10, 0, 0)).await;

    let scheduler = scheduler_with(&pool, Arc::clone(&clock), StdDuration::from_secs(5));

    assert_eq!(scheduler.tick().await.unwrap(), TickReport::default());
    assert_eq!(reload(&pool, task.id).await.status, TaskStatus::Pending);

    clock.advance(Duration::hours(1));
    assert_eq!(scheduler.tick().await.unwrap().completed, 1);
    assert_eq!(reload(&pool, task.id).await.status, TaskStatus::Completed);

    // Nothing left to pick up.
    assert_eq!(scheduler.tick().await.unwrap().found, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_task_does_not_stop_the_tick(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "mixed").await;
    let bad = location.join("uploads").join("scan.bmp");
    std::fs::write(&bad, b"BM").unwrap();
    let good = write_upload(&location, "b.png", 20, 20);
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let bad_task = new_task(&pool, project_id, &bad, at(8, 0, 0)).await;
    let good_task = new_task(&pool, project_id, &good, at(8, 30, 0)).await;

    let scheduler = scheduler_with(&pool, clock, StdDuration::from_secs(5));
    let report = scheduler.tick().await.unwrap();

    assert_eq!(
        report,
        TickReport {
            found: 2,
            completed: 1,
            failed: 1
        }
    );
    assert_eq!(reload(&pool, bad_task.id).await.status, TaskStatus::Failed);
    assert_eq!(reload(&pool, good_task.id).await.status, TaskStatus::Completed);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_start_and_stop_are_idempotent(pool: SqlitePool) {
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let scheduler = scheduler_with(&pool, clock, StdDuration::from_secs(60));

    assert!(!scheduler.is_running());
    assert!(scheduler.start());
    assert!(!scheduler.start());
    assert!(scheduler.is_running());

    assert!(scheduler.stop().await);
    assert!(!scheduler.stop().await);
    assert!(!scheduler.is_running());

    // Can be restarted after a stop.
    assert!(scheduler.start());
    assert!(scheduler.stop().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_running_loop_processes_due_task(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "loop").await;
    let source = write_upload(&location, "a.jpg", 40, 30);
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let task = new_task(&pool, project_id, &source, at(9, 0, 0)).await;

    let scheduler = scheduler_with(&pool, clock, StdDuration::from_millis(20));
    scheduler.start();

    let completed = tokio::time::timeout(StdDuration::from_secs(10), async {
        loop {
            if reload(&pool, task.id).await.status == TaskStatus::Completed {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(20)).await;
        }
    })
    .await;
    scheduler.stop().await;

    assert!(completed.is_ok(), "task was not processed by the running loop");
    assert!(location.join("resized").join("a.jpg").exists());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stop_waits_for_task_in_flight(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "gated").await;
    let source = write_upload(&location, "a.png", 10, 10);
    new_task(&pool, project_id, &source, at(9, 0, 0)).await;

    let processor = Arc::new(GatedProcessor::new());
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let scheduler = Arc::new(Scheduler::new(
        pool.clone(),
        processor.clone(),
        clock,
        StdDuration::from_millis(10),
    ));

    scheduler.start();
    tokio::time::timeout(StdDuration::from_secs(10), processor.started.notified())
        .await
        .expect("processor was never invoked");

    let stopping = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.stop().await }
    });

    tokio::time::sleep(StdDuration::from_millis(100)).await;
    assert!(!stopping.is_finished(), "stop returned while a task was in flight");
    assert!(!processor.finished.load(Ordering::SeqCst));

    processor.release.notify_one();
    assert!(stopping.await.unwrap());
    assert!(processor.finished.load(Ordering::SeqCst));
    assert!(!scheduler.is_running());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_start_is_refused_until_stop_completes(pool: SqlitePool) {
    let root = tempfile::tempdir().unwrap();
    let (project_id, location) = new_project(&pool, root.path(), "restart").await;
    let source = write_upload(&location, "a.png", 10, 10);
    new_task(&pool, project_id, &source, at(9, 0, 0)).await;

    let processor = Arc::new(GatedProcessor::new());
    let clock = Arc::new(TestClock::new(at(9, 0, 0)));
    let scheduler = Arc::new(Scheduler::new(
        pool.clone(),
        processor.clone(),
        clock,
        StdDuration::from_millis(10),
    ));

    scheduler.start();
    tokio::time::timeout(StdDuration::from_secs(10), processor.started.notified())
        .await
        .expect("processor was never invoked");

    let stopping = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.stop().await }
    });
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    // The first loop is still inside its tick; a second loop must not start.
    assert!(!scheduler.start());
    assert!(!scheduler.is_running());
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(processor.calls.load(Ordering::SeqCst), 1);

    processor.release.notify_one();
    assert!(stopping.await.unwrap());
    assert_eq!(processor.calls.load(Ordering::SeqCst), 1);

    // Once drained the scheduler can be started again.
    assert!(scheduler.start());
    assert!(scheduler.stop().await);
}
