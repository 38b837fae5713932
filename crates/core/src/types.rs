/// All database primary keys are SQLite INTEGER PRIMARY KEY rowids.
pub type DbId = i64;

/// Timestamps are wall-clock times in the configured scheduling zone.
///
/// They carry no offset; the zone is fixed by the [`Clock`](crate::clock::Clock)
/// that produced them.
pub type LocalTimestamp = chrono::NaiveDateTime;
