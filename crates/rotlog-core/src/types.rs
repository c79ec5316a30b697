//! Core types for rotlog

use std::str::FromStr;

use crate::error::{Error, Result};

/// Log severity
///
/// `All` and `Off` only make sense as a logger's minimum level: every message
/// passes `All`, none passes `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    #[default]
    All,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Off,
}

impl Level {
    /// Levels a message can actually be logged at
    pub const MESSAGE_LEVELS: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::All => "ALL",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Whether a message at this level can be emitted at all
    pub fn is_message_level(&self) -> bool {
        !matches!(self, Level::All | Level::Off)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Level::All),
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Byte multiplier for size thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Unit {
    B = 1,
    KB = 1 << 10,
    MB = 1 << 20,
    GB = 1 << 30,
    TB = 1 << 40,
}

impl Unit {
    pub fn bytes(&self) -> u64 {
        *self as u64
    }

    /// Threshold in bytes for `count` units, saturating on overflow
    pub fn times(&self, count: u64) -> u64 {
        count.saturating_mul(self.bytes())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "B" => Ok(Unit::B),
            "KB" | "K" => Ok(Unit::KB),
            "MB" | "M" => Ok(Unit::MB),
            "GB" | "G" => Ok(Unit::GB),
            "TB" | "T" => Ok(Unit::TB),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

/// When the active file is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollPolicy {
    #[default]
    None,
    Daily,
    Hourly,
    Size,
}

impl RollPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollPolicy::None => "none",
            RollPolicy::Daily => "daily",
            RollPolicy::Hourly => "hourly",
            RollPolicy::Size => "size",
        }
    }
}

impl FromStr for RollPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RollPolicy::None),
            "daily" | "day" => Ok(RollPolicy::Daily),
            "hourly" | "hour" => Ok(RollPolicy::Hourly),
            "size" | "file" => Ok(RollPolicy::Size),
            _ => Err(Error::InvalidPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for RollPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
