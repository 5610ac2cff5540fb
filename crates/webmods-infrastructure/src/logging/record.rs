//! Log record handed to the handler

use chrono::{DateTime, Utc};
use tracing::Level;
use webmods_domain::value_objects::{Attr, AttrValue};

/// A single log record before process and context enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Timestamp when the record was created
    pub time: DateTime<Utc>,
    /// Severity
    pub level: Level,
    /// Log message
    pub message: String,
    /// Target module/component
    pub target: String,
    /// Source file of the call site
    pub file: Option<String>,
    /// Source line of the call site
    pub line: Option<u32>,
    /// Attributes given at the call site, in order
    pub attrs: Vec<Attr>,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new<M: Into<String>>(level: Level, message: M) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            target: String::new(),
            file: None,
            line: None,
            attrs: Vec::new(),
        }
    }

    /// Set the target
    pub fn with_target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = target.into();
        self
    }

    /// Append one attribute
    pub fn with_attr<K: Into<String>, V: Into<AttrValue>>(mut self, key: K, value: V) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    /// Append attributes
    pub fn with_attrs<I: IntoIterator<Item = Attr>>(mut self, attrs: I) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Call site as `file:line`, when known
    pub fn source(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{file}:{line}")),
            (Some(file), None) => Some(file.clone()),
            _ => None,
        }
    }
}
