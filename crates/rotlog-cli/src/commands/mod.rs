//! Command implementations

pub mod check;
pub mod identity;
pub mod write;

use anyhow::{Context, Result};
use rotlog::{LogConfig, LogSpec, Logger, Registry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Load and validate the given config, or search the current directory for
/// one
///
/// Relative directories in the config resolve against the config's own
/// directory.
pub fn load_spec(config: Option<&Path>) -> Result<(LogSpec, PathBuf)> {
    let (config, path) = match config {
        Some(path) => (LogConfig::load(path)?, path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            LogConfig::find_and_load(&cwd)?
        }
    };
    info!("Using config {}", path.display());

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((config.into_spec(&base_dir)?, path))
}

/// Build a logger from the config; creates the configured log files
pub fn load_logger(config: Option<&Path>) -> Result<Logger> {
    let (spec, _) = load_spec(config)?;
    Ok(Logger::from_spec(&spec, Arc::new(Registry::new()))?)
}
