//! rotlog - Leveled logging to the console and rotating files
//!
//! ```no_run
//! use std::sync::Arc;
//! use rotlog::{Level, Logger, Registry, Unit};
//!
//! let logger = Logger::new(Arc::new(Registry::new()));
//! logger.set_rolling_file("logs", "app.log", 5, 10, Unit::MB)?;
//! logger.set_level_file(Level::Error, "logs", "error.log")?;
//! logger.set_level(Level::Info);
//!
//! logger.info("service started");
//! logger.error(format_args!("request {} failed", 42));
//! # Ok::<(), rotlog::Error>(())
//! ```

mod console;
mod format;
mod global;
mod guard;
mod logger;

pub use format::{Fields, Template};
pub use global::*;
pub use logger::{Logger, Route};

pub use rotlog_core::{
    ConfigFormat, Error, Level, LogConfig, LogSpec, Result, RollPolicy, Unit,
};
pub use rotlog_logs::{
    Clock, ManualClock, Registry, RotatingWriter, SystemClock, WriterId, WriterLimits,
};
