//! Console appender

use chrono::NaiveDateTime;
use rotlog_core::LINE_TIME_FORMAT;
use rotlog_logs::Record;
use std::io::Write;

/// `YYYY/MM/DD HH:MM:SS file.rs 42 message`, or the rendered template
pub(crate) fn console_line(record: &Record<'_>, now: NaiveDateTime) -> String {
    let time = now.format(LINE_TIME_FORMAT);
    match record.body {
        Some(body) => format!("{} {}", time, body),
        None => format!(
            "{} {} {} {}",
            time,
            record.short_file(),
            record.line(),
            record.message
        ),
    }
}

pub(crate) fn write(record: &Record<'_>, now: NaiveDateTime) {
    let line = console_line(record, now);
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}
