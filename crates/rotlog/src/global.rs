//! Process-wide default logger
//!
//! Convenience functions for applications that want a single logger without
//! passing it around. It writes through [`Registry::global`].

use once_cell::sync::Lazy;
use rotlog_core::{Level, Result, Unit};
use rotlog_logs::Registry;
use std::fmt::Display;
use std::path::Path;

use crate::logger::Logger;

static DEFAULT: Lazy<Logger> = Lazy::new(|| Logger::new(Registry::global()));

/// The default logger (console only until configured)
pub fn default_logger() -> &'static Logger {
    &DEFAULT
}

pub fn set_console(console: bool) {
    DEFAULT.set_console(console);
}

pub fn set_level(level: Level) {
    DEFAULT.set_level(level);
}

pub fn set_format(format: &str) {
    DEFAULT.set_format(format);
}

pub fn set_rolling_file(
    dir: impl AsRef<Path>,
    filename: &str,
    max_count: i32,
    max_size: u64,
    unit: Unit,
) -> Result<()> {
    DEFAULT.set_rolling_file(dir, filename, max_count, max_size, unit)
}

pub fn set_rolling_daily(dir: impl AsRef<Path>, filename: &str) -> Result<()> {
    DEFAULT.set_rolling_daily(dir, filename)
}

pub fn set_rolling_hourly(dir: impl AsRef<Path>, filename: &str) -> Result<()> {
    DEFAULT.set_rolling_hourly(dir, filename)
}

pub fn set_level_file(level: Level, dir: impl AsRef<Path>, filename: &str) -> Result<()> {
    DEFAULT.set_level_file(level, dir, filename)
}

#[track_caller]
pub fn trace(msg: impl Display) {
    DEFAULT.trace(msg);
}

#[track_caller]
pub fn debug(msg: impl Display) {
    DEFAULT.debug(msg);
}

#[track_caller]
pub fn info(msg: impl Display) {
    DEFAULT.info(msg);
}

#[track_caller]
pub fn warn(msg: impl Display) {
    DEFAULT.warn(msg);
}

#[track_caller]
pub fn error(msg: impl Display) {
    DEFAULT.error(msg);
}

#[track_caller]
pub fn fatal(msg: impl Display) {
    DEFAULT.fatal(msg);
}
