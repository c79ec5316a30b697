//! Fallback diagnostics for failures that must not reach the caller

use std::fmt::Display;
use std::io::Write;
use tracing::warn;

/// Report a swallowed failure on stderr and as a tracing event
pub fn report(context: &str, err: &dyn Display) {
    warn!("{}: {}", context, err);
    let _ = writeln!(std::io::stderr(), "rotlog: {}: {}", context, err);
}
