//! A single log call as seen by a writer

use chrono::NaiveDateTime;
use rotlog_core::{Level, LINE_TIME_FORMAT};
use std::panic::Location;

/// Message plus call-site, ready to be appended
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    /// Raw message; its byte length is what the size policy counts
    pub message: &'a str,
    /// Rendered template replacing the default `LEVEL message` body
    pub body: Option<&'a str>,
    pub location: &'static Location<'static>,
}

impl<'a> Record<'a> {
    pub fn new(level: Level, message: &'a str, location: &'static Location<'static>) -> Self {
        Self {
            level,
            message,
            body: None,
            location,
        }
    }

    pub fn with_body(mut self, body: &'a str) -> Self {
        self.body = Some(body);
        self
    }

    /// Base name of the calling source file
    pub fn short_file(&self) -> &'static str {
        short_file(self.location.file())
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// `YYYY/MM/DD HH:MM:SS file.rs:42: LEVEL message\n`
    pub fn render_line(&self, now: NaiveDateTime) -> String {
        let mut line = format!(
            "{} {}:{}: ",
            now.format(LINE_TIME_FORMAT),
            self.short_file(),
            self.line()
        );
        match self.body {
            Some(body) => line.push_str(body),
            None => {
                line.push_str(self.level.as_str());
                line.push(' ');
                line.push_str(self.message);
            }
        }
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }
}

/// Strip directories from a source path
pub(crate) fn short_file(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}
