//! rotlog Logs - Rotating log files shared across loggers
//!
//! A [`Registry`] owns at most one [`RotatingWriter`] per physical file. Loggers
//! refer to writers by [`WriterId`], ask the [`rotation`] evaluator whether a
//! rollover is due and append formatted [`Record`]s.

mod clock;
mod diag;
mod identity;
mod record;
mod registry;
pub mod rotation;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use diag::report;
pub use identity::WriterId;
pub use record::Record;
pub use registry::Registry;
pub use rotation::{Markers, Snapshot};
pub use writer::{rotated_path, RotatingWriter, WriterLimits};

use rotlog_core::{Error, Result};
use std::path::Path;

/// Create the log directory (recursively) if it does not exist yet
pub fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| Error::create_dir(dir.to_path_buf(), e))?;
    }
    Ok(())
}
