#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime};
use image::{Rgb, RgbImage};
use resizer_core::clock::Clock;
use resizer_db::models::image_task::{ImageTask, NewImageTask};
use resizer_db::models::project::CreateProject;
use resizer_db::repositories::{ImageTaskRepo, ProjectRepo};
use sqlx::SqlitePool;

/// A clock that only moves when told to.
pub struct TestClock {
    now: Mutex<NaiveDateTime>,
}

impl TestClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }
}

pub fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

/// Create a project row whose location is `<root>/<name>`.
pub async fn new_project(pool: &SqlitePool, root: &Path, name: &str) -> (i64, PathBuf) {
    let location = root.join(name);
    std::fs::create_dir_all(location.join("uploads")).unwrap();
    let input = CreateProject {
        name: name.to_string(),
        description: None,
    };
    let project = ProjectRepo::create(pool, &input, location.to_str().unwrap(), at(8, 0, 0))
        .await
        .unwrap();
    (project.id, location)
}

/// Write a small RGB image at `<location>/uploads/<file_name>`.
pub fn write_upload(location: &Path, file_name: &str, width: u32, height: u32) -> PathBuf {
    let path = location.join("uploads").join(file_name);
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]))
        .save(&path)
        .unwrap();
    path
}

pub async fn new_task(
    pool: &SqlitePool,
    project_id: i64,
    image_path: &Path,
    scheduled_for: NaiveDateTime,
) -> ImageTask {
    let input = NewImageTask {
        project_id,
        image_path: image_path.to_str().unwrap().to_string(),
        target_width: 100,
        target_height: 50,
        scheduled_for,
    };
    ImageTaskRepo::create(pool, &input, at(8, 30, 0)).await.unwrap()
}

pub async fn reload(pool: &SqlitePool, task_id: i64) -> ImageTask {
    ImageTaskRepo::find_by_id(pool, task_id).await.unwrap().unwrap()
}
