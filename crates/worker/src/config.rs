use std::time::Duration;

use chrono::FixedOffset;
use resizer_core::clock::{parse_utc_offset, ZonedClock};

/// Scheduler configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between polls of the task store (default: `5`).
    pub interval_secs: u64,
    /// Zone in which `scheduled_for` timestamps are interpreted. `None`
    /// follows the host's local zone, daylight-saving changes included.
    pub utc_offset: Option<FixedOffset>,
}

impl SchedulerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `SCHEDULER_INTERVAL_SECS` | `5`                     |
    /// | `SCHEDULER_UTC_OFFSET`    | host's local zone       |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("SCHEDULER_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .ok()
            .filter(|secs| *secs > 0)
            .expect("SCHEDULER_INTERVAL_SECS must be a positive integer");

        let utc_offset = std::env::var("SCHEDULER_UTC_OFFSET").ok().map(|value| {
            parse_utc_offset(&value)
                .unwrap_or_else(|e| panic!("SCHEDULER_UTC_OFFSET is invalid: {e}"))
        });

        Self {
            interval_secs,
            utc_offset,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn clock(&self) -> ZonedClock {
        match self.utc_offset {
            Some(offset) => ZonedClock::new(offset),
            None => ZonedClock::system_local(),
        }
    }
}
