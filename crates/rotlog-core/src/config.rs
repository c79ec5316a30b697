//! Configuration file parsing for rotlog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{Level, RollPolicy, Unit};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file structure (rotlog.toml/yaml/json)
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Minimum level (default: "all")
    pub level: Option<String>,
    /// Echo messages to the console (default: true)
    #[serde(default = "default_console")]
    pub console: bool,
    /// Line template, e.g. "{level} {message}"
    pub format: Option<String>,
    /// Default rolling file for every level
    pub rolling: Option<RollingConfig>,
    /// Dedicated files for single levels
    #[serde(default)]
    pub level_files: Vec<LevelFileConfig>,
}

fn default_console() -> bool {
    true
}

/// Rolling file configuration from config file
#[derive(Debug, Deserialize)]
pub struct RollingConfig {
    /// "daily", "hourly" or "size"
    pub policy: String,
    pub dir: String,
    pub file: String,
    /// Rotated files to keep for the size policy (<= 0: unbounded)
    pub max_count: Option<i32>,
    /// Size threshold in `unit`s for the size policy
    pub max_size: Option<u64>,
    /// "B", "KB", "MB", "GB" or "TB" (default: "MB")
    pub unit: Option<String>,
}

/// Per-level file configuration from config file
#[derive(Debug, Deserialize)]
pub struct LevelFileConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
}

/// Validated logger settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSpec {
    pub level: Level,
    pub console: bool,
    pub format: Option<String>,
    pub rolling: Option<RollingSpec>,
    pub level_files: Vec<LevelFileSpec>,
}

/// Validated rolling file settings
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSpec {
    pub policy: RollPolicy,
    pub dir: PathBuf,
    pub file: String,
    pub max_count: i32,
    pub max_size: u64,
    pub unit: Unit,
}

/// Validated per-level file settings
#[derive(Debug, Clone, PartialEq)]
pub struct LevelFileSpec {
    pub level: Level,
    pub dir: PathBuf,
    pub file: String,
}

impl LogConfig {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Validate and convert to `LogSpec`, resolving relative directories
    /// against `base_dir`
    pub fn into_spec(self, base_dir: &Path) -> Result<LogSpec> {
        let level = match &self.level {
            Some(level) => level.parse::<Level>()?,
            None => Level::All,
        };

        let rolling = self
            .rolling
            .map(|rolling| rolling.into_spec(base_dir))
            .transpose()?;

        let level_files = self
            .level_files
            .into_iter()
            .map(|lf| lf.into_spec(base_dir))
            .collect::<Result<Vec<_>>>()?;

        Ok(LogSpec {
            level,
            console: self.console,
            format: self.format.filter(|f| !f.is_empty()),
            rolling,
            level_files,
        })
    }
}

impl LogSpec {
    /// Directory and file name receiving messages at `level`, if any
    ///
    /// Resolved the way a logger built from these settings routes: the last
    /// matching level file wins, TRACE shares DEBUG's file, and every other
    /// level falls back to the rolling file.
    pub fn file_for(&self, level: Level) -> Option<(&Path, &str)> {
        let shared = |l: Level| if l == Level::Trace { Level::Debug } else { l };
        self.level_files
            .iter()
            .rev()
            .find(|lf| shared(lf.level) == shared(level))
            .map(|lf| (lf.dir.as_path(), lf.file.as_str()))
            .or_else(|| {
                self.rolling
                    .as_ref()
                    .map(|rolling| (rolling.dir.as_path(), rolling.file.as_str()))
            })
    }
}

impl RollingConfig {
    pub fn into_spec(self, base_dir: &Path) -> Result<RollingSpec> {
        let policy = self.policy.parse::<RollPolicy>()?;
        if policy == RollPolicy::None {
            return Err(Error::InvalidPolicy(self.policy));
        }

        let unit = match &self.unit {
            Some(unit) => unit.parse::<Unit>()?,
            None => Unit::MB,
        };

        if policy == RollPolicy::Size && self.max_size.unwrap_or(0) == 0 {
            return Err(Error::config(format!(
                "Rolling file {} uses the size policy but has no max_size",
                self.file
            )));
        }

        Ok(RollingSpec {
            policy,
            dir: resolve_dir(base_dir, &self.dir),
            file: validate_file_name(self.file)?,
            max_count: self.max_count.unwrap_or(DEFAULT_MAX_FILES as i32),
            max_size: self.max_size.unwrap_or(0),
            unit,
        })
    }
}

impl LevelFileConfig {
    pub fn into_spec(self, base_dir: &Path) -> Result<LevelFileSpec> {
        let level = self.level.parse::<Level>()?;
        if !level.is_message_level() {
            return Err(Error::InvalidLevel(self.level));
        }

        Ok(LevelFileSpec {
            level,
            dir: resolve_dir(base_dir, &self.dir),
            file: validate_file_name(self.file)?,
        })
    }
}

fn resolve_dir(base_dir: &Path, dir: &str) -> PathBuf {
    let p = Path::new(dir);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn validate_file_name(file: String) -> Result<String> {
    if file.is_empty() || file.contains('/') || file.contains('\\') {
        return Err(Error::config(format!("Invalid log file name: {:?}", file)));
    }
    Ok(file)
}
