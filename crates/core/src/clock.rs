//! Wall-clock source for task scheduling.
//!
//! Every time comparison in the pipeline (task creation, the ready-task
//! query, scheduler ticks) reads "now" from a [`Clock`] handed in by the
//! caller. The scheduling zone is a plain configuration value; nothing
//! here touches process-wide time-zone state.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::error::CoreError;
use crate::types::LocalTimestamp;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in this clock's zone.
    fn now(&self) -> LocalTimestamp;

    /// Offset from UTC of this clock's zone.
    fn utc_offset(&self) -> FixedOffset;

    /// Convert an instant carrying its own offset into this clock's zone.
    fn localize(&self, instant: DateTime<FixedOffset>) -> LocalTimestamp {
        instant.with_timezone(&self.utc_offset()).naive_local()
    }

    /// Parse an RFC 3339 timestamp (e.g. `2024-05-01T09:30:00+08:00`) and
    /// convert it into this clock's zone.
    fn parse_rfc3339(&self, input: &str) -> Result<LocalTimestamp, CoreError> {
        let instant = DateTime::parse_from_rfc3339(input.trim()).map_err(|e| {
            CoreError::InvalidInput(format!("invalid scheduled time format '{input}': {e}"))
        })?;
        Ok(self.localize(instant))
    }
}

/// The production clock: system time in either a fixed UTC offset or the
/// host's local zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    /// `None` follows the host zone, including daylight-saving changes.
    offset: Option<FixedOffset>,
}

impl ZonedClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// Follow the host's local zone. The offset is looked up on every call,
    /// so a daylight-saving change takes effect without a restart.
    pub fn system_local() -> Self {
        Self { offset: None }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> LocalTimestamp {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    fn utc_offset(&self) -> FixedOffset {
        match self.offset {
            Some(offset) => offset,
            None => *Local::now().offset(),
        }
    }

    /// In host-local mode the offset in effect at `instant` is used, not
    /// the current one.
    fn localize(&self, instant: DateTime<FixedOffset>) -> LocalTimestamp {
        match self.offset {
            Some(offset) => instant.with_timezone(&offset).naive_local(),
            None => instant.with_timezone(&Local).naive_local(),
        }
    }
}

/// Parse a UTC offset such as `+08:00`, `-0530`, `+8` or `Z`.
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset, CoreError> {
    let invalid = || CoreError::InvalidInput(format!("invalid UTC offset '{input}'"));

    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
