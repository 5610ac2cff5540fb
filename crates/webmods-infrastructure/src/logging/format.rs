//! Output formats
//!
//! | Format | Config name | Output |
//! |--------|-------------|--------|
//! | [`LogFormat::Pretty`] | `tint` (default) | Coloured console line |
//! | [`LogFormat::Json`] | `json` | One JSON object per line |
//! | [`LogFormat::Plain`] | `plain-text` | `key=value` pairs |
//!
//! Every attribute is written in order. Only JSON collapses duplicate keys,
//! keeping the position of the first occurrence and the value of the last.
//! JSON attributes named `time`, `level` or `msg` are written as
//! `fields.<key>` so the record header survives.

use crate::logging::LogRecord;
use chrono::SecondsFormat;
use nu_ansi_term::{Color, Style};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::Level;
use webmods_domain::value_objects::AttrValue;

/// Header keys of a JSON record
const RESERVED_JSON_KEYS: [&str; 3] = ["time", "level", "msg"];

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Coloured, human-oriented console output
    #[default]
    #[serde(rename = "tint", alias = "pretty")]
    Pretty,
    /// Line-delimited JSON
    #[serde(rename = "json")]
    Json,
    /// Plain `key=value` text
    #[serde(rename = "plain-text", alias = "text")]
    Plain,
}

impl LogFormat {
    /// Parse a configured format name; unknown names select [`LogFormat::Pretty`]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "plain-text" | "text" => Self::Plain,
            _ => Self::Pretty,
        }
    }

    /// Canonical configuration name
    pub fn name(self) -> &'static str {
        match self {
            Self::Pretty => "tint",
            Self::Json => "json",
            Self::Plain => "plain-text",
        }
    }

    /// Render one record as a newline-terminated line
    pub fn render(self, record: &LogRecord) -> String {
        let mut line = match self {
            Self::Pretty => render_pretty(record),
            Self::Json => render_json(record),
            Self::Plain => render_plain(record),
        };
        line.push('\n');
        line
    }
}

/// Level name as written in records
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARN",
        Level::ERROR => "ERROR",
    }
}

fn render_json(record: &LogRecord) -> String {
    let mut map = serde_json::Map::new();
    map.insert(
        "time".to_string(),
        record.time.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
    );
    map.insert("level".to_string(), level_name(record.level).into());
    map.insert("msg".to_string(), record.message.clone().into());
    for attr in &record.attrs {
        let key = if RESERVED_JSON_KEYS.contains(&attr.key.as_str()) {
            format!("fields.{}", attr.key)
        } else {
            attr.key.clone()
        };
        map.insert(key, attr.value.to_json());
    }
    serde_json::Value::Object(map).to_string()
}

fn render_plain(record: &LogRecord) -> String {
    let mut line = format!(
        "time={} level={} msg={}",
        record.time.to_rfc3339_opts(SecondsFormat::Millis, true),
        level_name(record.level),
        quote(&record.message)
    );
    for attr in &record.attrs {
        let _ = write!(line, " {}={}", quote(&attr.key), plain_value(&attr.value));
    }
    line
}

fn plain_value(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => quote(s),
        other => quote(&other.to_string()),
    }
}

/// Quote a text value when it would not survive a `key=value` split
fn quote(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '='));
    if needs_quotes {
        format!("{s:?}")
    } else {
        s.to_string()
    }
}

fn render_pretty(record: &LogRecord) -> String {
    let dim = Style::new().dimmed();
    let (label, color) = match record.level {
        Level::TRACE => ("TRC", Color::DarkGray),
        Level::DEBUG => ("DBG", Color::Blue),
        Level::INFO => ("INF", Color::Green),
        Level::WARN => ("WRN", Color::Yellow),
        Level::ERROR => ("ERR", Color::Red),
    };

    let mut line = format!(
        "{} {} {}",
        dim.paint(record.time.format("%b %e %H:%M:%S%.3f").to_string()),
        color.bold().paint(label),
        record.message
    );
    for attr in &record.attrs {
        let value = plain_value(&attr.value);
        let value = if attr.key == "err" || attr.key == "error" {
            Color::Red.paint(value).to_string()
        } else {
            value
        };
        let _ = write!(line, " {}{}", dim.paint(format!("{}=", attr.key)), value);
    }
    line
}
