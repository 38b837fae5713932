//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the input DTOs used to create or patch it.

pub mod image_task;
pub mod project;
pub mod status;
pub mod user;
