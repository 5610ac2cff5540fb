//! Configuration loader
//!
//! Resolves the layer files for a command and mode, merges them with
//! Figment and overlays the environment. File keys are lowercased so that
//! environment variables reach mixed-case keys.

use crate::config::ConfigStore;
use crate::constants::{
    CONFIG_BASE_NAME, CONFIG_EXTENSIONS, DEFAULT_CONFIG_DIR, DEFAULT_MODE, ENV_PATH_SEPARATOR,
    MODE_ENV_VAR,
};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use webmods_domain::error::{Error, Result};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Command name, selects the `<cmd>/` sub-directory
    cmd: String,

    /// Directory holding the layer files
    config_dir: PathBuf,

    /// Explicit mode; falls back to `$MODE`
    mode: Option<String>,
}

impl ConfigLoader {
    /// Create a loader for `cmd` reading from `./configs`
    pub fn new<S: Into<String>>(cmd: S) -> Self {
        Self {
            cmd: cmd.into(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            mode: None,
        }
    }

    /// Set the configuration directory
    pub fn with_config_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the mode instead of reading `$MODE`
    pub fn with_mode<S: Into<String>>(mut self, mode: S) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Command name
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Configuration directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Effective mode: explicit, then `$MODE`, then `development`
    pub fn mode(&self) -> String {
        self.mode
            .clone()
            .or_else(|| env::var(MODE_ENV_VAR).ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODE.to_string())
    }

    /// Existing layer files, lowest precedence first
    pub fn layer_files(&self) -> Vec<PathBuf> {
        let mode = self.mode();
        let cmd_dir = self.config_dir.join(&self.cmd);

        let mut layers = Vec::new();
        if let Some(cmd_base) = find_layer(&cmd_dir, CONFIG_BASE_NAME) {
            layers.push(cmd_base);
        } else {
            layers.extend(find_layer(&self.config_dir, CONFIG_BASE_NAME));
            layers.extend(find_layer(&self.config_dir, &mode));
        }
        layers.extend(find_layer(&cmd_dir, &mode));
        layers
    }

    /// Load configuration from all layers
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when a layer file cannot be parsed. Missing
    /// files are skipped.
    pub fn load(&self) -> Result<ConfigStore> {
        let mode = self.mode();

        let mut files = Figment::new();
        for path in self.layer_files() {
            debug!(path = %path.display(), "Merging configuration layer");
            files = merge_file(files, &path);
        }

        let file_tree = lowercase_keys(extract(&files)?);

        let env_layer = Env::raw()
            .filter(|key| is_nested_env_key(key.as_str()))
            .split(ENV_PATH_SEPARATOR);
        let root = extract(&Figment::from(Serialized::defaults(file_tree)).merge(env_layer))?;

        Ok(ConfigStore::new(root, self.cmd.clone(), mode).with_env_overrides(env_overrides()))
    }
}

/// First `<dir>/<stem>.<ext>` that exists, probing extensions in order
fn find_layer(dir: &Path, stem: &str) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("toml") => figment.merge(Toml::file(path)),
        _ => figment.merge(Yaml::file(path)),
    }
}

fn extract(figment: &Figment) -> Result<serde_json::Value> {
    figment
        .extract()
        .map_err(|e| Error::configuration(format!("Failed to load configuration: {e}")))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), lowercase_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Dotted path addressed by an environment variable name
///
/// `CACHE__LOCAL_CAPACITY` addresses `cache.local_capacity`. Names with an
/// empty segment address nothing.
fn env_path(key: &str) -> Option<String> {
    if key.is_empty() || key.split(ENV_PATH_SEPARATOR).any(str::is_empty) {
        return None;
    }
    Some(key.to_ascii_lowercase().replace(ENV_PATH_SEPARATOR, "."))
}

/// Nested names (`A__B`) also merge into the tree
fn is_nested_env_key(key: &str) -> bool {
    key.contains(ENV_PATH_SEPARATOR) && env_path(key).is_some()
}

/// Every process variable as a raw string override
fn env_overrides() -> Vec<(String, String)> {
    Env::raw()
        .iter()
        .filter_map(|(key, value)| env_path(key.as_str()).map(|path| (path, value)))
        .collect()
}
