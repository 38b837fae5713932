//! Domain building blocks for the image resizer.
//!
//! This crate has zero internal dependencies so the store, the worker and
//! the HTTP layer can all share it.

pub mod clock;
pub mod error;
pub mod imaging;
pub mod output_path;
pub mod project_dirs;
pub mod types;
