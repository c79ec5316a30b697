//! Log writer with rotation support

use parking_lot::{Mutex, RwLock};
use rotlog_core::{Error, Result, RollPolicy, UNBOUNDED_FILE_COUNT};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::diag;
use crate::identity::WriterId;
use crate::record::Record;
use crate::rotation::{self, Markers, Snapshot};

/// Limits fixed when a writer is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterLimits {
    /// Size threshold in bytes (0: no size threshold)
    pub max_size: u64,
    /// Length of the numbered suffix ring
    pub max_count: u32,
}

impl Default for WriterLimits {
    fn default() -> Self {
        Self {
            max_size: 0,
            max_count: UNBOUNDED_FILE_COUNT,
        }
    }
}

impl WriterLimits {
    pub fn new(max_size: u64, max_count: u32) -> Self {
        Self {
            max_size,
            max_count: if max_count == 0 {
                UNBOUNDED_FILE_COUNT
            } else {
                max_count
            },
        }
    }
}

/// The currently open file and the period it belongs to
struct ActiveFile {
    file: Mutex<Option<File>>,
    markers: Markers,
    /// Last numbered suffix handed out by the size policy
    suffix: u32,
}

/// Single owner of one physical log file
///
/// Appends share the read side of `active` and are serialized on the file
/// mutex; rotation takes the write side, so a line is never split by a
/// rename. The size counter is only reset under the write lock.
pub struct RotatingWriter {
    id: WriterId,
    dir: PathBuf,
    filename: String,
    path: PathBuf,
    limits: WriterLimits,
    size: AtomicU64,
    clock: Arc<dyn Clock>,
    active: RwLock<ActiveFile>,
}

impl RotatingWriter {
    /// Open (or create) `dir/filename` for appending
    ///
    /// Never fails: if the file cannot be opened the failure is reported and
    /// the writer starts without a handle. The next rotation retries the open.
    pub fn open(
        id: WriterId,
        dir: &Path,
        filename: &str,
        limits: WriterLimits,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let path = dir.join(filename);
        let suffix = initial_suffix(&path, limits.max_count);

        let (file, size) = match open_append(&path) {
            Ok((file, size)) => (Some(file), size),
            Err(e) => {
                diag::report(&format!("failed to open {}", path.display()), &e);
                (None, 0)
            }
        };

        debug!(
            "Opened log writer {} ({} bytes, suffix {})",
            path.display(),
            size,
            suffix
        );

        let markers = Markers::at(clock.now());
        Self {
            id,
            dir: dir.to_path_buf(),
            filename: filename.to_string(),
            path,
            limits,
            size: AtomicU64::new(size),
            clock,
            active: RwLock::new(ActiveFile {
                file: Mutex::new(file),
                markers,
                suffix,
            }),
        }
    }

    /// Append one formatted line
    ///
    /// The size counter grows by the raw message length, not by the length
    /// of the rendered line.
    pub fn append(&self, record: &Record<'_>) -> Result<()> {
        let line = record.render_line(self.clock.now());

        let active = self.active.read();
        let mut file = active.file.lock();
        let file = file
            .as_mut()
            .ok_or_else(|| Error::FileNotOpen(self.path.clone()))?;

        file.write_all(line.as_bytes())?;
        self.size
            .fetch_add(record.message.len() as u64, Ordering::SeqCst);

        Ok(())
    }

    /// Current markers and size
    pub fn snapshot(&self) -> Snapshot {
        let active = self.active.read();
        self.snapshot_of(&active)
    }

    fn snapshot_of(&self, active: &ActiveFile) -> Snapshot {
        Snapshot {
            markers: active.markers,
            size: self.size.load(Ordering::SeqCst),
            max_size: self.limits.max_size,
        }
    }

    /// Whether `policy` wants a rotation at `now`
    pub fn is_due(&self, policy: RollPolicy, now: chrono::NaiveDateTime) -> bool {
        rotation::is_due(policy, &self.snapshot(), now)
    }

    /// Rotate if due, re-checking under the exclusive lock
    ///
    /// Returns whether a rotation happened. Callers racing on the same due
    /// condition rotate once; the others observe the refreshed markers.
    pub fn rotate_if_due(&self, policy: RollPolicy) -> Result<bool> {
        let now = self.clock.now();
        if !self.is_due(policy, now) {
            return Ok(false);
        }

        let mut active = self.active.write();
        if !rotation::is_due(policy, &self.snapshot_of(&active), now) {
            return Ok(false);
        }

        self.rotate_locked(&mut active, policy)?;
        Ok(true)
    }

    /// Rotate unconditionally
    pub fn rotate(&self, policy: RollPolicy) -> Result<()> {
        let mut active = self.active.write();
        self.rotate_locked(&mut active, policy)
    }

    fn rotate_locked(&self, active: &mut ActiveFile, policy: RollPolicy) -> Result<()> {
        let next = rotation::next_suffix(active.suffix, self.limits.max_count);
        let suffix = match policy {
            RollPolicy::None => return Ok(()),
            RollPolicy::Daily => active.markers.day_suffix(),
            RollPolicy::Hourly => active.markers.hour_suffix(),
            RollPolicy::Size => next.to_string(),
        };
        let target = rotated_path(&self.path, &suffix);

        debug!(
            "Rotating log file: {} -> {}",
            self.path.display(),
            target.display()
        );

        // Close the active handle before renaming it
        active.file.get_mut().take();

        let renamed = remove_stale(&target)
            .and_then(|_| fs::rename(&self.path, &target))
            .map_err(|e| {
                Error::rotation(format!(
                    "{} -> {}: {}",
                    self.path.display(),
                    target.display(),
                    e
                ))
            });

        // A failed rename leaves the ring slot free for the next attempt
        if renamed.is_ok() && policy == RollPolicy::Size {
            active.suffix = next;
        }

        let reopened = match open_append(&self.path) {
            Ok((file, size)) => {
                *active.file.get_mut() = Some(file);
                self.size.store(size, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                self.size.store(0, Ordering::SeqCst);
                Err(Error::from(e))
            }
        };

        active.markers = Markers::at(self.clock.now());

        renamed.and(reopened)
    }

    pub fn id(&self) -> &WriterId {
        &self.id
    }

    /// Get the active file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn limits(&self) -> WriterLimits {
        self.limits
    }

    /// Accumulated message bytes since the active file was opened
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::SeqCst)
    }

    /// Last numbered suffix used by the size policy
    pub fn suffix(&self) -> u32 {
        self.active.read().suffix
    }

    pub fn markers(&self) -> Markers {
        self.active.read().markers
    }

    pub fn is_open(&self) -> bool {
        self.active.read().file.lock().is_some()
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("limits", &self.limits)
            .field("size", &self.size())
            .finish()
    }
}

/// Get the path for a rotated log file
pub fn rotated_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Highest contiguous numbered suffix already on disk, below `max_count`
///
/// Lets a restarted process continue the ring instead of overwriting `.1`.
fn initial_suffix(path: &Path, max_count: u32) -> u32 {
    let mut suffix = 0;
    for i in 1..max_count {
        if rotated_path(path, &i.to_string()).exists() {
            suffix = i;
        } else {
            break;
        }
    }
    suffix
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn remove_stale(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rotlog_core::Level;
    use std::panic::Location;
    use std::thread;
    use tempfile::TempDir;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn writer_in(dir: &Path, limits: WriterLimits, clock: Arc<ManualClock>) -> RotatingWriter {
        let id = WriterId::resolve(dir, "test.log");
        RotatingWriter::open(id, dir, "test.log", limits, clock)
    }

    fn record(message: &str) -> Record<'_> {
        Record::new(Level::Info, message, Location::caller())
    }

    #[test]
    fn test_writer_creation() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock);

        assert!(writer.path().exists());
        assert!(writer.is_open());
        assert_eq!(writer.size(), 0);
        assert_eq!(writer.suffix(), 0);
        assert_eq!(writer.markers(), Markers::at(start()));
    }

    #[test]
    fn test_existing_file_size_is_picked_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.log"), b"0123456789").unwrap();

        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock);
        assert_eq!(writer.size(), 10);
    }

    #[test]
    fn test_append_counts_raw_message_bytes() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock);

        writer.append(&record("Hello, world!")).unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert!(content.starts_with("2024/06/01 10:30:00 writer.rs:"));
        assert!(content.ends_with("INFO Hello, world!\n"));
        assert_eq!(writer.size(), "Hello, world!".len() as u64);
        assert!(fs::metadata(writer.path()).unwrap().len() > writer.size());
    }

    #[test]
    fn test_size_rotation_ring() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::new(1024, 3), clock);
        let chunk = "x".repeat(1024);

        let mut seen = Vec::new();
        for round in 0..4 {
            writer.append(&record(&format!("{}{}", round, chunk))).unwrap();
            assert!(writer.rotate_if_due(RollPolicy::Size).unwrap());
            seen.push(writer.suffix());
            assert_eq!(writer.size(), 0);
        }

        assert_eq!(seen, vec![1, 2, 3, 1]);
        // .1 was overwritten by the fourth rotation
        let first = fs::read_to_string(dir.path().join("test.log.1")).unwrap();
        assert!(first.contains(&format!("3{}", chunk)));
        assert!(!dir.path().join("test.log.4").exists());
        assert_eq!(fs::metadata(writer.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_rotate_if_due_declines_twice() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::new(4, 5), clock);

        writer.append(&record("12345")).unwrap();
        assert!(writer.rotate_if_due(RollPolicy::Size).unwrap());
        assert!(!writer.rotate_if_due(RollPolicy::Size).unwrap());

        assert!(dir.path().join("test.log.1").exists());
        assert!(!dir.path().join("test.log.2").exists());
        assert!(writer.path().exists());
    }

    #[test]
    fn test_daily_rotation_uses_closed_day() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock.clone());

        writer.append(&record("before midnight")).unwrap();
        assert!(!writer.rotate_if_due(RollPolicy::Daily).unwrap());

        clock.advance(Duration::days(1));
        assert!(writer.rotate_if_due(RollPolicy::Daily).unwrap());
        assert!(!writer.rotate_if_due(RollPolicy::Daily).unwrap());

        let rotated = dir.path().join("test.log.2024-06-01");
        assert!(fs::read_to_string(rotated).unwrap().contains("before midnight"));
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "");
        assert_eq!(writer.markers().day, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_hourly_rotation_uses_closed_hour() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock.clone());

        writer.append(&record("ten thirty")).unwrap();
        clock.advance(Duration::minutes(29));
        assert!(!writer.rotate_if_due(RollPolicy::Hourly).unwrap());

        clock.advance(Duration::minutes(1));
        assert!(writer.rotate_if_due(RollPolicy::Hourly).unwrap());
        assert!(dir.path().join("test.log.2024-06-01_10").exists());
    }

    #[test]
    fn test_rotation_overwrites_existing_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.log.2024-06-01"), b"stale").unwrap();

        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock.clone());
        writer.append(&record("fresh")).unwrap();

        clock.advance(Duration::days(1));
        writer.rotate(RollPolicy::Daily).unwrap();

        let content = fs::read_to_string(dir.path().join("test.log.2024-06-01")).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("fresh"));
    }

    #[test]
    fn test_failed_rename_keeps_ring_slot() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("test.log.1");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("occupied"), b"").unwrap();

        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::new(4, 3), clock);
        writer.append(&record("12345")).unwrap();

        assert!(writer.rotate_if_due(RollPolicy::Size).is_err());
        assert_eq!(writer.suffix(), 0);
        assert!(writer.is_open());

        fs::remove_dir_all(&blocker).unwrap();
        assert!(writer.rotate_if_due(RollPolicy::Size).unwrap());
        assert_eq!(writer.suffix(), 1);
        assert!(fs::read_to_string(&blocker).unwrap().contains("12345"));
        assert!(!dir.path().join("test.log.2").exists());
    }

    #[test]
    fn test_clock_moving_backwards_does_not_rotate() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock.clone());
        writer.append(&record("before the jump")).unwrap();

        clock.set(start() - Duration::days(1));
        assert!(!writer.rotate_if_due(RollPolicy::Daily).unwrap());
        assert!(!writer.rotate_if_due(RollPolicy::Hourly).unwrap());

        clock.set(start() + Duration::days(1));
        assert!(writer.rotate_if_due(RollPolicy::Daily).unwrap());
        assert!(dir.path().join("test.log.2024-06-01").exists());
    }

    #[test]
    fn test_rotate_none_is_noop() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::default(), clock);

        writer.append(&record("kept")).unwrap();
        writer.rotate(RollPolicy::None).unwrap();
        assert_eq!(writer.size(), 4);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_restart_continues_suffix_sequence() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.log.1"), b"one").unwrap();
        fs::write(dir.path().join("test.log.2"), b"two").unwrap();

        let clock = Arc::new(ManualClock::new(start()));
        let writer = writer_in(dir.path(), WriterLimits::new(1, 5), clock);
        assert_eq!(writer.suffix(), 2);

        writer.append(&record("restart")).unwrap();
        writer.rotate_if_due(RollPolicy::Size).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("test.log.1")).unwrap(), "one");
        assert!(fs::read_to_string(dir.path().join("test.log.3"))
            .unwrap()
            .contains("restart"));
    }

    #[test]
    fn test_missing_directory_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let clock = Arc::new(ManualClock::new(start()));
        let writer = RotatingWriter::open(
            WriterId::resolve(&missing, "test.log"),
            &missing,
            "test.log",
            WriterLimits::default(),
            clock,
        );

        assert!(!writer.is_open());
        let err = writer.append(&record("lost")).unwrap_err();
        assert!(matches!(err, Error::FileNotOpen(_)));
        assert_eq!(writer.size(), 0);
    }

    #[test]
    fn test_concurrent_appends_keep_lines_intact() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let writer = Arc::new(writer_in(dir.path(), WriterLimits::default(), clock));

        const THREADS: usize = 8;
        const LINES: usize = 200;
        let message = "m".repeat(64);

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let writer = writer.clone();
                let message = message.clone();
                thread::spawn(move || {
                    for _ in 0..LINES {
                        writer.append(&record(&message)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(writer.size(), (THREADS * LINES * message.len()) as u64);

        let content = fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), THREADS * LINES);
        assert!(lines.iter().all(|l| l.ends_with(&format!("INFO {}", message))));
    }

    #[test]
    fn test_rotated_path() {
        let base = PathBuf::from("/var/log/app.log");
        assert_eq!(rotated_path(&base, "1"), PathBuf::from("/var/log/app.log.1"));
        assert_eq!(
            rotated_path(&base, "2024-01-31"),
            PathBuf::from("/var/log/app.log.2024-01-31")
        );
    }
}
