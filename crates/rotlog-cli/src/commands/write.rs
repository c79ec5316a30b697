//! Write command implementation

use anyhow::{Context, Result};
use rotlog::Level;
use std::io::BufRead;
use tracing::debug;

use crate::cli::WriteArgs;

pub fn execute(args: WriteArgs) -> Result<()> {
    let level: Level = args.level.parse()?;
    if !level.is_message_level() {
        anyhow::bail!("Cannot write lines at level {}", level);
    }

    let logger = super::load_logger(args.config.as_deref())?;

    let mut count = 0usize;
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        logger.log(level, format_args!("{}", line));
        count += 1;
    }

    debug!("Wrote {} lines at {}", count, level);
    Ok(())
}
