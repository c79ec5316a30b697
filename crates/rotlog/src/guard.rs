//! Keeps faults in the log path away from the caller

use std::any::Any;
use std::backtrace::Backtrace;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

/// Run `f`, turning a panic into a diagnostic on stderr
pub(crate) fn catch<F: FnOnce()>(f: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        let backtrace = Backtrace::force_capture();
        let _ = writeln!(
            std::io::stderr(),
            "rotlog: panic while logging: {}\n{}",
            panic_message(payload.as_ref()),
            backtrace
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
