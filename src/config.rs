//! Store configuration
//!
//! Read from ~/.config/localblob/config.json unless a path is given.
//! Every field is optional:
//!
//! ```json
//! { "backend": "filesystem", "base_dir": "/var/lib/blobs", "default_location": "default" }
//! ```

use crate::{BlobStore, Error, Result, DEFAULT_LOCATION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which storage strategy backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Contents vanish when the process exits
    Memory,
    #[default]
    Filesystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Root directory of the filesystem backend (default: data dir/localblob)
    pub base_dir: Option<PathBuf>,
    /// Location given to containers created without one
    pub default_location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: Backend::default(),
            base_dir: None,
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl StoreConfig {
    /// Default config file path (~/.config/localblob/config.json)
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?
            .join("localblob")
            .join("config.json"))
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load `path` if given, else the default file if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Directory used by the filesystem backend
    pub fn resolved_base_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.base_dir {
            return Ok(dir.clone());
        }
        Ok(dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not find data directory".into()))?
            .join("localblob"))
    }

    /// Build the store this config describes
    pub fn open(&self) -> Result<BlobStore> {
        let store = match self.backend {
            Backend::Memory => BlobStore::transient(),
            Backend::Filesystem => BlobStore::filesystem(self.resolved_base_dir()?)?,
        };
        debug!(backend = store.kind(), "Opened blob store");
        Ok(store.with_default_location(self.default_location.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend": "memory"}"#).unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.base_dir, None);
        assert_eq!(config.default_location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = StoreConfig {
            backend: Backend::Filesystem,
            base_dir: Some(dir.path().join("blobs")),
            default_location: "eu-west".into(),
        };
        config.save(&path).unwrap();

        assert_eq!(StoreConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_open_filesystem_store() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            backend: Backend::Filesystem,
            base_dir: Some(dir.path().join("blobs")),
            default_location: "eu-west".into(),
        };

        let store = config.open().unwrap();
        assert_eq!(store.kind(), "filesystem");
        store.create_container_in_location("c", None).unwrap();
        assert_eq!(store.location_of("c").unwrap(), "eu-west");
        assert!(dir.path().join("blobs").join("c").is_dir());
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match StoreConfig::load(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("config.json")),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
