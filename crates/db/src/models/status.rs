//! Image task status and its state machine.
//!
//! Stored as lowercase text in `image_tasks.status` and serialized the same
//! way in JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of an image task.
///
/// ```text
/// pending -> processing -> completed
///                       \-> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Statuses reachable from `self`. Terminal states return an empty slice.
    pub fn valid_transitions(self) -> &'static [TaskStatus] {
        match self {
            Self::Pending => &[Self::Processing],
            Self::Processing => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    pub fn can_transition(self, to: TaskStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
