use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::file_utils::write_atomic;
use crate::utils::{Error, Result};

/// Launcher-wide settings stored in `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub java_path: PathBuf,
    pub memory: MemoryConfig,
    pub default_username: String,
    pub jvm_args: Vec<String>,
    pub game_args: Vec<String>,
}

/// JVM heap bounds in the `-Xmx`/`-Xms` notation, e.g. `2G` or `512M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub min: String,
    pub max: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            java_path: PathBuf::from("java"),
            memory: MemoryConfig::default(),
            default_username: "User".to_string(),
            jvm_args: Vec::new(),
            game_args: Vec::new(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            min: "1G".to_string(),
            max: "2G".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the config at `path`, writing the defaults there first if it is absent.
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| Error::serialization(path, e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path).await?;
                info!("Wrote default config to {path:?}");
                Ok(config)
            }
            Err(e) => Err(Error::storage(path, e)),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::serialization(path, e))?;
        write_atomic(path, json.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::load_or_create(&path).await.unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(AppConfig::load_or_create(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn partial_config_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "java_path": "/opt/jdk17/bin/java" }"#).unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();

        assert_eq!(config.java_path, PathBuf::from("/opt/jdk17/bin/java"));
        assert_eq!(config.default_username, "User");
        assert_eq!(config.memory, MemoryConfig::default());
    }

    #[tokio::test]
    async fn corrupt_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_or_create(&path).await.unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
