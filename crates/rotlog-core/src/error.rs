//! Error types for rotlog

use std::path::PathBuf;

/// rotlog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Invalid rolling policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid size unit: {0}")]
    InvalidUnit(String),

    #[error("Rotation failed: {0}")]
    Rotation(String),

    #[error("Log file not open: {0}")]
    FileNotOpen(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for rotlog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn rotation<S: Into<String>>(msg: S) -> Self {
        Error::Rotation(msg.into())
    }

    /// Map a directory creation failure, keeping permission problems distinct
    pub fn create_dir(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Error::PermissionDenied(format!("{}: {}", path.display(), source))
        } else {
            Error::CreateDirectory { path, source }
        }
    }
}
