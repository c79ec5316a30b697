//! Line templates
//!
//! A template is plain text with placeholders: `{level}`, `{message}`,
//! `{file}`, `{line}` and `{time}`. `{{` and `}}` produce literal braces;
//! unknown placeholders are kept as written.

use chrono::NaiveDateTime;
use rotlog_core::{Level, LINE_TIME_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Level,
    Message,
    File,
    Line,
    Time,
}

impl Part {
    fn placeholder(name: &str) -> Option<Self> {
        match name {
            "level" => Some(Part::Level),
            "message" => Some(Part::Message),
            "file" => Some(Part::File),
            "line" => Some(Part::Line),
            "time" => Some(Part::Time),
            _ => None,
        }
    }
}

/// Values substituted into a template
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    pub level: Level,
    pub message: &'a str,
    pub file: &'a str,
    pub line: u32,
    pub time: NaiveDateTime,
}

/// Parsed line template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find(['{', '}']) {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                literal.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }
            if tail.starts_with('}') {
                literal.push('}');
                rest = &tail[1..];
                continue;
            }

            match tail.find('}') {
                Some(end) => {
                    match Part::placeholder(&tail[1..end]) {
                        Some(part) => {
                            if !literal.is_empty() {
                                parts.push(Part::Literal(std::mem::take(&mut literal)));
                            }
                            parts.push(part);
                        }
                        None => literal.push_str(&tail[..=end]),
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    literal.push_str(tail);
                    rest = "";
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self {
            source: source.to_string(),
            parts,
        }
    }

    pub fn render(&self, fields: &Fields<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + fields.message.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Level => out.push_str(fields.level.as_str()),
                Part::Message => out.push_str(fields.message),
                Part::File => out.push_str(fields.file),
                Part::Line => out.push_str(&fields.line.to_string()),
                Part::Time => out.push_str(&fields.time.format(LINE_TIME_FORMAT).to_string()),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
