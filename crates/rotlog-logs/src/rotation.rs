//! Rotation policy evaluation
//!
//! Pure decision logic: nothing here touches the filesystem. A writer hands
//! out a [`Snapshot`] of its markers and size, and [`is_due`] answers whether
//! the active file has to be rolled over.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rotlog_core::{RollPolicy, DATE_FORMAT, HOUR_FORMAT};

/// Day and hour during which the active file was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub day: NaiveDate,
    pub hour: NaiveDateTime,
}

impl Markers {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            day: now.date(),
            hour: hour_of(now),
        }
    }

    /// Suffix for a file closed by the daily policy
    pub fn day_suffix(&self) -> String {
        self.day.format(DATE_FORMAT).to_string()
    }

    /// Suffix for a file closed by the hourly policy
    pub fn hour_suffix(&self) -> String {
        self.hour.format(HOUR_FORMAT).to_string()
    }
}

/// Point-in-time view of a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub markers: Markers,
    /// Accumulated message bytes since the active file was opened
    pub size: u64,
    /// Size threshold; zero disables the size policy
    pub max_size: u64,
}

/// Truncate to the start of the hour
pub fn hour_of(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_hms_opt(now.hour(), 0, 0).unwrap_or(now)
}

/// Whether the active file must be rotated at `now`
pub fn is_due(policy: RollPolicy, snapshot: &Snapshot, now: NaiveDateTime) -> bool {
    match policy {
        RollPolicy::None => false,
        RollPolicy::Daily => now.date() > snapshot.markers.day,
        RollPolicy::Hourly => hour_of(now) > snapshot.markers.hour,
        RollPolicy::Size => snapshot.max_size > 0 && snapshot.size >= snapshot.max_size,
    }
}

/// Next suffix in the ring `1..=max_count`
pub fn next_suffix(current: u32, max_count: u32) -> u32 {
    if max_count == 0 {
        return current.saturating_add(1);
    }
    current % max_count + 1
}
