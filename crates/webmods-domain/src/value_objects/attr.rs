//! Log attributes
//!
//! An [`Attr`] is a `(key, typed value)` pair attached to a log record.
//! Attribute lists are ordered and keys are not unique: emitters see every
//! entry in the order it was appended.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Typed value of a log attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// UTF-8 string
    String(String),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Elapsed time
    Duration(Duration),
    /// Arbitrary structured value
    Json(serde_json::Value),
}

impl AttrValue {
    /// Convert to a JSON value for structured emitters
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Uint(u) => serde_json::Value::from(*u),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Duration(d) => serde_json::Value::String(format!("{d:?}")),
            Self::Json(v) => v.clone(),
        }
    }

    /// Borrow the string payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Duration(d) => write!(f, "{d:?}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        Self::Uint(value as u64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Duration> for AttrValue {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// A single `(key, value)` log attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attr {
    /// Attribute key
    pub key: String,
    /// Attribute value
    pub value: AttrValue,
}

impl Attr {
    /// Create an attribute from anything convertible into an [`AttrValue`]
    pub fn new<K: Into<String>, V: Into<AttrValue>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// String attribute
    pub fn string<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self::new(key, AttrValue::String(value.into()))
    }

    /// Signed integer attribute
    pub fn int<K: Into<String>>(key: K, value: i64) -> Self {
        Self::new(key, AttrValue::Int(value))
    }

    /// Floating point attribute
    pub fn float<K: Into<String>>(key: K, value: f64) -> Self {
        Self::new(key, AttrValue::Float(value))
    }

    /// Boolean attribute
    pub fn bool<K: Into<String>>(key: K, value: bool) -> Self {
        Self::new(key, AttrValue::Bool(value))
    }

    /// Duration attribute
    pub fn duration<K: Into<String>>(key: K, value: Duration) -> Self {
        Self::new(key, AttrValue::Duration(value))
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
