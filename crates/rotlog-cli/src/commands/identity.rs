//! Identity command implementation

use anyhow::Result;
use rotlog::WriterId;
use std::path::Path;

pub fn execute(dir: &Path, file: &str) -> Result<()> {
    println!("{}", WriterId::resolve(dir, file));
    Ok(())
}
