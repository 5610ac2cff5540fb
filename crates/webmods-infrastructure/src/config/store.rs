//! Immutable configuration store
//!
//! Values are addressed by dot-separated paths, matched case-insensitively
//! per segment. Environment overrides are consulted before the tree and
//! keep their raw string form. Typed getters never fail: a missing or
//! malformed value yields the type's zero value.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use webmods_domain::error::{Error, Result};

/// Merged configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    root: Value,
    env: HashMap<String, Value>,
    cmd: String,
    mode: String,
}

impl ConfigStore {
    /// Wrap an already merged tree
    pub fn new<C: Into<String>, M: Into<String>>(root: Value, cmd: C, mode: M) -> Self {
        Self {
            root,
            env: HashMap::new(),
            cmd: cmd.into(),
            mode: mode.into(),
        }
    }

    /// Add environment overrides keyed by dotted path
    ///
    /// Paths are matched case-insensitively and take precedence over the
    /// tree. They are not part of [`ConfigStore::all`].
    pub fn with_env_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.env.extend(
            overrides
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), Value::String(v.into()))),
        );
        self
    }

    /// Command this configuration was loaded for
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Mode this configuration was loaded for
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The whole tree, without single-segment environment overrides
    pub fn all(&self) -> &Value {
        &self.root
    }

    /// Raw value at `path`
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        if let Some(value) = self.env.get(&path.to_ascii_lowercase()) {
            return Some(value);
        }
        path.split('.')
            .try_fold(&self.root, |node, segment| child(node, segment))
            .filter(|v| !v.is_null())
    }

    /// Whether `path` resolves to a non-null value
    pub fn is_set(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// String value; numbers and booleans are rendered
    pub fn get_string(&self, path: &str) -> String {
        match self.get(path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Integer value; floats are truncated
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_i64(&self, path: &str) -> i64 {
        match self.get(path) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            _ => 0,
        }
    }

    /// Floating point value
    pub fn get_f64(&self, path: &str) -> f64 {
        match self.get(path) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    /// Boolean value; accepts `1 t true` / `0 f false` in any case
    pub fn get_bool(&self, path: &str) -> bool {
        match self.get(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => parse_bool(s).unwrap_or(false),
            _ => false,
        }
    }

    /// Duration value
    ///
    /// Strings use human-readable units (`"90s"`, `"1m 30s"`, `"250ms"`);
    /// bare numbers are seconds.
    pub fn get_duration(&self, path: &str) -> Duration {
        match self.get(path) {
            Some(Value::Number(n)) => n.as_f64().map_or(Duration::ZERO, seconds),
            Some(Value::String(s)) => parse_duration(s).unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// List of strings; a string value is split on commas
    pub fn get_string_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Deserialize the sub-tree at `path`
    ///
    /// A missing section deserializes from an empty map, so types with serde
    /// defaults come back filled with their defaults.
    ///
    /// # Errors
    ///
    /// [`webmods_domain::Error::Configuration`] when the sub-tree does not match `T`.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self
            .get(path)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        serde_json::from_value(value).map_err(|e| {
            let message = format!("Invalid configuration section {path}: {e}");
            Error::configuration_with_source(message, e)
        })
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment).or_else(|| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(segment))
                .map(|(_, value)| value)
        }),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return Some(seconds(secs));
    }
    humantime::parse_duration(s).ok()
}
