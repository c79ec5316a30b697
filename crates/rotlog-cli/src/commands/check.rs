//! Check command implementation

use anyhow::Result;
use rotlog::{Level, WriterId};

use crate::cli::CheckArgs;

/// Print where each level would go, without opening or creating any file
pub fn execute(args: CheckArgs) -> Result<()> {
    let (spec, path) = super::load_spec(args.config.as_deref())?;

    println!("config: {}", path.display());
    for level in Level::MESSAGE_LEVELS {
        let enabled = if level >= spec.level { "on" } else { "off" };
        match spec.file_for(level) {
            Some((dir, file)) => println!(
                "{:<6} {:<3} {} ({})",
                level.as_str(),
                enabled,
                dir.join(file).display(),
                WriterId::resolve(dir, file)
            ),
            None => println!("{:<6} {:<3} console", level.as_str(), enabled),
        }
    }

    Ok(())
}
