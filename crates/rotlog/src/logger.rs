//! Logger instances and per-level stream routing

use parking_lot::{Mutex, RwLock};
use rotlog_core::{
    file_count_limit, Error, Level, LogConfig, LogSpec, Result, RollPolicy, Unit,
};
use rotlog_logs::{ensure_log_dir, report, Record, Registry, RotatingWriter, WriterId, WriterLimits};
use std::fmt::{self, Display};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::console;
use crate::format::{Fields, Template};
use crate::guard;

/// Number of per-level overrides: DEBUG (shared with TRACE) through FATAL
const OVERRIDE_SLOTS: usize = 5;

fn override_slot(level: Level) -> Option<usize> {
    match level {
        Level::Trace | Level::Debug => Some(0),
        Level::Info => Some(1),
        Level::Warn => Some(2),
        Level::Error => Some(3),
        Level::Fatal => Some(4),
        Level::All | Level::Off => None,
    }
}

/// Where a message at some level ends up
#[derive(Debug, Clone)]
pub enum Route {
    File(Arc<RotatingWriter>),
    Console,
}

#[derive(Debug, Clone)]
struct LoggerConfig {
    level: Level,
    console: bool,
    format: Option<Template>,
    policy: RollPolicy,
    limits: WriterLimits,
    default_writer: Option<WriterId>,
    overrides: [Option<WriterId>; OVERRIDE_SLOTS],
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::All,
            console: true,
            format: None,
            policy: RollPolicy::None,
            limits: WriterLimits::default(),
            default_writer: None,
            overrides: Default::default(),
        }
    }
}

impl LoggerConfig {
    fn target(&self, level: Level) -> Option<&WriterId> {
        override_slot(level)
            .and_then(|slot| self.overrides[slot].as_ref())
            .or(self.default_writer.as_ref())
    }
}

/// A leveled logger writing to the console and/or rotating files
///
/// Files are owned by the shared [`Registry`]; several loggers configured
/// with the same directory and file name write through one writer.
pub struct Logger {
    registry: Arc<Registry>,
    config: RwLock<LoggerConfig>,
    /// Serializes the due-check and rotation of this logger's writers
    rotation_lock: Mutex<()>,
}

impl Logger {
    /// Console-only logger accepting every level
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            config: RwLock::new(LoggerConfig::default()),
            rotation_lock: Mutex::new(()),
        }
    }

    /// Build a logger from validated settings
    pub fn from_spec(spec: &LogSpec, registry: Arc<Registry>) -> Result<Self> {
        let logger = Self::new(registry);
        logger.set_level(spec.level);
        logger.set_console(spec.console);
        if let Some(format) = &spec.format {
            logger.set_format(format);
        }

        if let Some(rolling) = &spec.rolling {
            match rolling.policy {
                RollPolicy::Daily => logger.set_rolling_daily(&rolling.dir, &rolling.file)?,
                RollPolicy::Hourly => logger.set_rolling_hourly(&rolling.dir, &rolling.file)?,
                RollPolicy::Size => logger.set_rolling_file(
                    &rolling.dir,
                    &rolling.file,
                    rolling.max_count,
                    rolling.max_size,
                    rolling.unit,
                )?,
                RollPolicy::None => {
                    return Err(Error::InvalidPolicy(rolling.policy.to_string()));
                }
            }
        }

        for level_file in &spec.level_files {
            logger.set_level_file(level_file.level, &level_file.dir, &level_file.file)?;
        }

        Ok(logger)
    }

    /// Build a logger from a config file, resolving relative paths against
    /// `base_dir`
    pub fn from_config(config: LogConfig, base_dir: &Path, registry: Arc<Registry>) -> Result<Self> {
        let spec = config.into_spec(base_dir)?;
        Self::from_spec(&spec, registry)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Echo messages to stderr in addition to any file
    pub fn set_console(&self, console: bool) {
        self.config.write().console = console;
    }

    /// Drop messages below `level`
    pub fn set_level(&self, level: Level) {
        self.config.write().level = level;
    }

    /// Use a line template; an empty string restores the default layout
    pub fn set_format(&self, format: &str) {
        self.config.write().format = if format.is_empty() {
            None
        } else {
            Some(Template::parse(format))
        };
    }

    /// Size-bounded rolling file: rotate once `max_size * unit` message bytes
    /// were written, keeping a ring of `max_count` numbered files
    pub fn set_rolling_file(
        &self,
        dir: impl AsRef<Path>,
        filename: &str,
        max_count: i32,
        max_size: u64,
        unit: Unit,
    ) -> Result<()> {
        let limits = WriterLimits::new(unit.times(max_size), file_count_limit(max_count));
        self.set_rolling(dir.as_ref(), filename, RollPolicy::Size, Some(limits))
    }

    /// Rolling file renamed to `filename.YYYY-MM-DD` when the day changes
    pub fn set_rolling_daily(&self, dir: impl AsRef<Path>, filename: &str) -> Result<()> {
        self.set_rolling(dir.as_ref(), filename, RollPolicy::Daily, None)
    }

    /// Rolling file renamed to `filename.YYYY-MM-DD_HH` when the hour changes
    pub fn set_rolling_hourly(&self, dir: impl AsRef<Path>, filename: &str) -> Result<()> {
        self.set_rolling(dir.as_ref(), filename, RollPolicy::Hourly, None)
    }

    fn set_rolling(
        &self,
        dir: &Path,
        filename: &str,
        policy: RollPolicy,
        limits: Option<WriterLimits>,
    ) -> Result<()> {
        ensure_log_dir(dir)?;
        let id = WriterId::resolve(dir, filename);
        self.registry
            .get_or_create(&id, dir, filename, limits.unwrap_or_default());

        debug!("Rolling {} file {}", policy, dir.join(filename).display());

        let mut config = self.config.write();
        config.policy = policy;
        if let Some(limits) = limits {
            config.limits = limits;
        }
        config.default_writer = Some(id);
        Ok(())
    }

    /// Send one level to a dedicated file; TRACE shares DEBUG's file
    ///
    /// The file rotates with this logger's policy and size limits as they
    /// are at the time of the call.
    pub fn set_level_file(&self, level: Level, dir: impl AsRef<Path>, filename: &str) -> Result<()> {
        let slot = override_slot(level).ok_or_else(|| Error::InvalidLevel(level.to_string()))?;
        let dir = dir.as_ref();
        ensure_log_dir(dir)?;

        let id = WriterId::resolve(dir, filename);
        let limits = self.config.read().limits;
        self.registry.get_or_create(&id, dir, filename, limits);

        self.config.write().overrides[slot] = Some(id);
        Ok(())
    }

    /// Writer (or console) receiving messages at `level`
    pub fn route(&self, level: Level) -> Route {
        let config = self.config.read();
        self.route_with(&config, level)
    }

    fn route_with(&self, config: &LoggerConfig, level: Level) -> Route {
        match config.target(level).and_then(|id| self.registry.get(id)) {
            Some(writer) => Route::File(writer),
            None => Route::Console,
        }
    }

    /// Whether a message at `level` passes the minimum level
    pub fn enabled(&self, level: Level) -> bool {
        level.is_message_level() && level >= self.config.read().level
    }

    /// Log one message; never fails and never panics into the caller
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let location = Location::caller();
        guard::catch(|| self.dispatch(level, args, location));
    }

    fn dispatch(&self, level: Level, args: fmt::Arguments<'_>, location: &'static Location<'static>) {
        if !level.is_message_level() {
            return;
        }

        // Nothing below runs under the config lock: formatting may log or
        // reconfigure through this same logger
        let (console, format, policy, route) = {
            let config = self.config.read();
            if level < config.level {
                return;
            }
            (
                config.console,
                config.format.clone(),
                config.policy,
                self.route_with(&config, level),
            )
        };

        let message = match args.as_str() {
            Some(s) => s.to_string(),
            None => args.to_string(),
        };
        let now = self.registry.clock().now();

        let record = Record::new(level, &message, location);
        let body = format.as_ref().map(|template| {
            template.render(&Fields {
                level,
                message: &message,
                file: record.short_file(),
                line: record.line(),
                time: now,
            })
        });
        let record = match &body {
            Some(body) => record.with_body(body),
            None => record,
        };

        if let Route::File(writer) = route {
            self.rotate_if_due(&writer, policy);
            if let Err(e) = writer.append(&record) {
                report(&format!("failed to write {}", writer.path().display()), &e);
            }
        }

        if console {
            console::write(&record, now);
        }
    }

    /// Unlocked check first; the writer re-checks under its own lock
    fn rotate_if_due(&self, writer: &RotatingWriter, policy: RollPolicy) {
        if !writer.is_due(policy, self.registry.clock().now()) {
            return;
        }

        let _guard = self.rotation_lock.lock();
        if let Err(e) = writer.rotate_if_due(policy) {
            report(&format!("failed to rotate {}", writer.path().display()), &e);
        }
    }

    #[track_caller]
    pub fn trace(&self, msg: impl Display) {
        self.log(Level::Trace, format_args!("{}", msg));
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Display) {
        self.log(Level::Debug, format_args!("{}", msg));
    }

    #[track_caller]
    pub fn info(&self, msg: impl Display) {
        self.log(Level::Info, format_args!("{}", msg));
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Display) {
        self.log(Level::Warn, format_args!("{}", msg));
    }

    #[track_caller]
    pub fn error(&self, msg: impl Display) {
        self.log(Level::Error, format_args!("{}", msg));
    }

    #[track_caller]
    pub fn fatal(&self, msg: impl Display) {
        self.log(Level::Fatal, format_args!("{}", msg));
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &*self.config.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rotlog_logs::ManualClock;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> Arc<Registry> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Arc::new(Registry::with_clock(Arc::new(ManualClock::new(start))))
    }

    fn file_logger(dir: &Path) -> Logger {
        let logger = Logger::new(registry());
        logger.set_console(false);
        logger
            .set_rolling_file(dir, "app.log", 3, 1, Unit::MB)
            .unwrap();
        logger
    }

    #[test]
    fn test_override_slots() {
        assert_eq!(override_slot(Level::Trace), override_slot(Level::Debug));
        assert_eq!(override_slot(Level::Fatal), Some(4));
        assert_eq!(override_slot(Level::Off), None);
    }

    #[test]
    fn test_console_only_route() {
        let logger = Logger::new(registry());
        assert!(matches!(logger.route(Level::Info), Route::Console));
    }

    #[test]
    fn test_default_and_override_routes() {
        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());
        logger
            .set_level_file(Level::Error, dir.path(), "error.log")
            .unwrap();
        logger
            .set_level_file(Level::Debug, dir.path(), "debug.log")
            .unwrap();

        let path_of = |level| match logger.route(level) {
            Route::File(writer) => writer.filename().to_string(),
            Route::Console => "console".to_string(),
        };

        assert_eq!(path_of(Level::Info), "app.log");
        assert_eq!(path_of(Level::Warn), "app.log");
        assert_eq!(path_of(Level::Error), "error.log");
        assert_eq!(path_of(Level::Debug), "debug.log");
        assert_eq!(path_of(Level::Trace), "debug.log");
    }

    #[test]
    fn test_level_file_inherits_limits() {
        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());
        logger
            .set_level_file(Level::Warn, dir.path(), "warn.log")
            .unwrap();

        match logger.route(Level::Warn) {
            Route::File(writer) => assert_eq!(writer.limits(), WriterLimits::new(1024 * 1024, 3)),
            Route::Console => panic!("expected a file route"),
        }
    }

    #[test]
    fn test_level_file_rejects_thresholds() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(registry());
        assert!(logger.set_level_file(Level::Off, dir.path(), "x.log").is_err());
        assert!(logger.set_level_file(Level::All, dir.path(), "x.log").is_err());
    }

    #[test]
    fn test_set_rolling_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("logs");
        let logger = Logger::new(registry());

        logger.set_rolling_daily(&nested, "daily.log").unwrap();
        assert!(nested.join("daily.log").exists());
    }

    #[test]
    fn test_set_rolling_reports_uncreatable_directory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let logger = Logger::new(registry());
        assert!(logger.set_rolling_hourly(blocker.join("logs"), "h.log").is_err());
        assert!(matches!(logger.route(Level::Info), Route::Console));
    }

    #[test]
    fn test_log_writes_call_site() {
        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());

        logger.info("hello");

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.starts_with("2024/04/01 12:00:00 logger.rs:"));
        assert!(content.ends_with(": INFO hello\n"));
    }

    #[test]
    fn test_log_with_format() {
        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());
        logger.set_format("<{level}> {message}");

        logger.log(Level::Warn, format_args!("{} items", 3));

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.ends_with(": <WARN> 3 items\n"));
    }

    #[test]
    fn test_threshold_levels_are_not_logged() {
        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());

        logger.log(Level::Off, format_args!("never"));
        logger.log(Level::All, format_args!("never"));

        assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "");
        assert!(!logger.enabled(Level::Off));
    }

    #[test]
    fn test_message_may_use_the_logger_it_is_logged_to() {
        struct Reentrant<'a>(&'a Logger);
        impl Display for Reentrant<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.debug("nested");
                self.0.set_level(Level::Info);
                write!(f, "outer")
            }
        }

        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());
        logger.warn(Reentrant(&logger));

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("DEBUG nested"));
        assert!(lines[1].ends_with("WARN outer"));
        assert!(!logger.enabled(Level::Debug));
    }

    #[test]
    fn test_panic_in_message_is_contained() {
        struct Exploding;
        impl Display for Exploding {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("display exploded");
            }
        }

        let dir = TempDir::new().unwrap();
        let logger = file_logger(dir.path());
        logger.error(Exploding);
        logger.info("still alive");

        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.contains("still alive"));
    }
}
