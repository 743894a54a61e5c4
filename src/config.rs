//! YAML configuration management
//!
//! Loads, saves, and hot-reloads the server configuration document. A watch
//! channel publishes a generation counter on every accepted update so the
//! serve loop can rebuild the capability registry; readers always see a
//! fully parsed `Arc<ServerConfig>`, never a half-applied document.

use crate::error::{ProteusError, Result};
use crate::types::ServerConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{info, warn};

/// Configuration manager for the Proteus server
pub struct ConfigManager {
    path: PathBuf,
    current: RwLock<Arc<ServerConfig>>,
    change_tx: watch::Sender<u64>,
}

impl ConfigManager {
    /// Load configuration from `path`
    ///
    /// A missing file is not an error: the default configuration is used,
    /// matching first-run behavior where no config has been authored yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            Self::parse(&raw)?
        } else {
            warn!("Config file {:?} not found, using defaults", path);
            ServerConfig::default()
        };

        info!(
            "Loaded config: {} tools, {} resources",
            config.tools.len(),
            config.resources.len()
        );

        let (change_tx, _) = watch::channel(0);
        Ok(Self {
            path,
            current: RwLock::new(Arc::new(config)),
            change_tx,
        })
    }

    fn parse(raw: &str) -> Result<ServerConfig> {
        // An empty file deserializes to no document; treat it as defaults
        if raw.trim().is_empty() {
            return Ok(ServerConfig::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ProteusError::Config(e.to_string()))
    }

    /// Current parsed configuration
    pub fn current(&self) -> Arc<ServerConfig> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Raw on-disk YAML text, for operator editing
    pub fn raw_yaml(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(std::fs::read_to_string(&self.path)?)
    }

    /// Persist `config` to disk and publish it as current
    pub fn save(&self, config: ServerConfig) -> Result<()> {
        let yaml = serde_yaml::to_string(&config)?;
        std::fs::write(&self.path, yaml)?;
        self.publish(config);
        Ok(())
    }

    /// Validate and apply a raw YAML document
    ///
    /// Rejected documents leave both the file and the in-memory config
    /// untouched, so the registry never sees an invalid definition.
    pub fn update_from_yaml(&self, yaml: &str) -> Result<Arc<ServerConfig>> {
        let config = Self::parse(yaml)?;
        std::fs::write(&self.path, yaml)?;
        self.publish(config);
        Ok(self.current())
    }

    fn publish(&self, config: ServerConfig) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(config);
        drop(guard);

        self.change_tx.send_modify(|generation| *generation += 1);
        info!("Configuration updated (generation {})", *self.change_tx.borrow());
    }

    /// Subscribe to configuration changes
    ///
    /// The value is a generation counter; receivers only care that it moved.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.change_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> ConfigManager {
        ConfigManager::load(dir.path().join("config.yaml")).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        assert_eq!(*manager.current(), ServerConfig::default());
        assert_eq!(manager.raw_yaml().unwrap(), "");
    }

    #[test]
    fn test_update_from_yaml_applies_and_persists() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        let yaml = r#"
name: Test Server
tools:
  - name: echo
    description: Echo back
    body: "return {{ message }}"
"#;
        manager.update_from_yaml(yaml).unwrap();
        assert_eq!(manager.current().name, "Test Server");
        assert_eq!(manager.current().tools.len(), 1);
        assert!(manager.raw_yaml().unwrap().contains("echo"));

        // A fresh manager sees the persisted document
        let reloaded = manager_in(&dir);
        assert_eq!(reloaded.current().name, "Test Server");
    }

    #[test]
    fn test_invalid_yaml_rejected_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        manager.update_from_yaml("name: Good").unwrap();

        let err = manager.update_from_yaml("tools: {not: [a, list").unwrap_err();
        assert!(matches!(err, ProteusError::Config(_)));
        assert_eq!(manager.current().name, "Good");
    }

    #[test]
    fn test_subscribe_sees_generation_bump() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        let rx = manager.subscribe();
        assert_eq!(*rx.borrow(), 0);

        manager.update_from_yaml("name: Bumped").unwrap();
        assert_eq!(*rx.borrow(), 1);
    }
}
