//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument.

pub mod image_task_repo;
pub mod project_repo;
pub mod user_repo;

pub use image_task_repo::ImageTaskRepo;
pub use project_repo::{DeletedProject, ProjectRepo};
pub use user_repo::UserRepo;
