//! Constants and default values for rotlog

/// Suffix format for files rotated by the daily policy
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Suffix format for files rotated by the hourly policy
pub const HOUR_FORMAT: &str = "%Y-%m-%d_%H";

/// Timestamp prefix of every written line
pub const LINE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// File count used when a size-bounded ring is configured without a limit
pub const UNBOUNDED_FILE_COUNT: u32 = i32::MAX as u32;

/// Default max rotated files to keep
pub const DEFAULT_MAX_FILES: u32 = 5;

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "rotlog.toml",
    "rotlog.yaml",
    "rotlog.yml",
    "rotlog.json",
];

/// Normalize a configured file count: zero or negative means unbounded
pub fn file_count_limit(max_count: i32) -> u32 {
    if max_count > 0 {
        max_count as u32
    } else {
        UNBOUNDED_FILE_COUNT
    }
}
