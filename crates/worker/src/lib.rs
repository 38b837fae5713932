//! Scheduled image-resize pipeline.
//!
//! - [`ImageWorker`] turns one pending task into a resized file and records
//!   the task's status on the way.
//! - [`Scheduler`] polls the task store on a fixed interval and feeds every
//!   ready task to a [`TaskProcessor`], one at a time.

pub mod config;
pub mod error;
pub mod processor;
pub mod scheduler;
pub mod shutdown;

pub use config::SchedulerConfig;
pub use error::WorkerError;
pub use processor::{ImageWorker, TaskProcessor};
pub use scheduler::{Scheduler, TickReport};
