//! Persistent cache of tool parameters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{read_map, write_map};
use crate::error::ConfigError;

/// Last used tool parameters keyed by string.
///
/// Tools access the cache through [`Cache::scope`], which prefixes every
/// key with the tool's name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache {
    values: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the cache file at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let values = if path.exists() {
            read_map(path)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened cache {} ({} keys)", path.display(), values.len());
        Ok(Self {
            values,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NoPath)?;
        write_map(path, &self.values)?;
        debug!("Saved cache {} ({} keys)", path.display(), self.values.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.values.get(key) else {
            return default;
        };
        match serde_json::from_value(value.clone()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring cached {key}: {e}");
                default
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// View of the cache with every key prefixed by `prefix/`
    pub fn scope<'a>(&'a mut self, prefix: &'a str) -> ScopedCache<'a> {
        ScopedCache {
            cache: self,
            prefix,
        }
    }
}

/// Prefixed view into a [`Cache`].
pub struct ScopedCache<'a> {
    cache: &'a mut Cache,
    prefix: &'a str,
}

impl ScopedCache<'_> {
    fn key(&self, key: &str) -> String {
        format!("{}/{key}", self.prefix)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.cache.get_or(&self.key(key), default)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let key = self.key(key);
        self.cache.set(&key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_keys() {
        let mut cache = Cache::new();
        cache.scope("sketchSpheres").set("radius", 0.25f32).unwrap();
        cache.scope("sculpt").set("radius", 2.0f32).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or("sketchSpheres/radius", 0.0f32), 0.25);
        assert_eq!(cache.scope("sculpt").get_or("radius", 0.0f32), 2.0);
        assert_eq!(cache.scope("other").get_or("radius", 0.1f32), 0.1);
    }

    #[test]
    fn test_wrong_type_uses_default() {
        let mut cache = Cache::new();
        cache.set("flag", true).unwrap();
        assert_eq!(cache.get_or("flag", 5u8), 5);
        assert!(cache.remove("flag"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_persistence() {
        let path = std::env::temp_dir().join(format!("trellis-cache-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut cache = Cache::open(&path).unwrap();
        assert!(cache.is_empty());
        cache.scope("sketchSpheres").set("height", 0.4f32).unwrap();
        cache.save().unwrap();

        let reopened = Cache::open(&path).unwrap();
        assert_eq!(reopened.get_or("sketchSpheres/height", 0.0f32), 0.4);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(Cache::new().save(), Err(ConfigError::NoPath)));
    }
}
