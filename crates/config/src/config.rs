//! Typed configuration lookup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::{DEFAULT_CURSOR_COLOR, DEFAULT_STEP_WIDTH_FACTOR};

pub(crate) fn read_map(path: &Path) -> Result<BTreeMap<String, Value>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(ConfigError::NotAnObject),
    }
}

pub(crate) fn write_map(path: &Path, values: &BTreeMap<String, Value>) -> Result<(), ConfigError> {
    let text = serde_json::to_string_pretty(values)?;
    fs::write(path, text).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Flat key/value settings, e.g. `editor/tool/sketchSpheres/cursorColor`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    values: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl Default for Config {
    /// Built-in editor defaults, not tied to a file
    fn default() -> Self {
        let mut config = Self::empty();
        config.insert_defaults();
        config
    }
}

impl Config {
    /// Config without any keys
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
            path: None,
        }
    }

    /// Load `path` on top of the built-in defaults.
    ///
    /// Keys present in the file override the defaults. The path is kept for
    /// [`Config::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::default();
        let loaded = read_map(path)?;
        debug!("Loaded {} config keys from {}", loaded.len(), path.display());
        config.values.extend(loaded);
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Write all keys back to the file this config was loaded from
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NoPath)?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        write_map(path, &self.values)?;
        debug!("Saved {} config keys to {}", self.values.len(), path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Typed value of `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidValue {
            key: key.to_string(),
            source,
        })
    }

    /// Typed value of `key`, or `default` if it is missing or has the wrong type
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(value) => value,
            Err(ConfigError::MissingKey(_)) => default,
            Err(e) => {
                warn!("{e}, using default");
                default
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn insert_defaults(&mut self) {
        let defaults = [
            (
                "editor/tool/sketchSpheres/cursorColor",
                serde_json::to_value(DEFAULT_CURSOR_COLOR),
            ),
            (
                "editor/tool/sketchSpheres/stepWidthFactor",
                serde_json::to_value(DEFAULT_STEP_WIDTH_FACTOR),
            ),
        ];
        for (key, value) in defaults {
            // Plain structs and floats always serialize
            if let Ok(value) = value {
                self.values.insert(key.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trellis-config-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let color: Color = config.get("editor/tool/sketchSpheres/cursorColor").unwrap();
        assert_eq!(color, DEFAULT_CURSOR_COLOR);
        assert_eq!(
            config.get_or("editor/tool/sketchSpheres/stepWidthFactor", 0.0f32),
            DEFAULT_STEP_WIDTH_FACTOR
        );
    }

    #[test]
    fn test_get_or_falls_back() {
        let mut config = Config::empty();
        assert_eq!(config.get_or("missing", 3u32), 3);

        config.set("name", "trellis").unwrap();
        assert_eq!(config.get_or("name", 7u32), 7);
        assert!(matches!(
            config.get::<u32>("name"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.get::<u32>("missing"),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn test_load_overrides_defaults() {
        let path = temp_file("override.json");
        fs::write(&path, r#"{ "editor/tool/sketchSpheres/stepWidthFactor": 0.75 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.get::<f32>("editor/tool/sketchSpheres/stepWidthFactor").unwrap(),
            0.75
        );
        assert!(config.contains("editor/tool/sketchSpheres/cursorColor"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_file("roundtrip.json");
        fs::write(&path, "{}").unwrap();

        let mut config = Config::load(&path).unwrap();
        config.set("editor/sample", Color::rgb(0.0, 0.5, 1.0)).unwrap();
        config.save().unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(
            reloaded.get::<Color>("editor/sample").unwrap(),
            Color::rgb(0.0, 0.5, 1.0)
        );
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_errors() {
        let path = temp_file("array.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::NotAnObject)));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(&path).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Io { .. })));
        assert!(matches!(Config::default().save(), Err(ConfigError::NoPath)));
    }
}
