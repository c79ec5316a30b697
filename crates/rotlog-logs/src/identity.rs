//! Stable identity of a physical log file

use md5::{Digest, Md5};
use std::path::Path;

/// Hex digest of a (directory, file name) pair
///
/// Two configurations naming the same directory and file resolve to the same
/// identity and therefore share one writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WriterId(String);

impl WriterId {
    pub fn resolve(dir: &Path, filename: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(dir.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(filename.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WriterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
