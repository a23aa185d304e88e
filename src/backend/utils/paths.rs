//! Path utilities.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use tokio::fs;

use super::file_utils::ensure_directory;
use crate::utils::Error;

/// Name of the main launcher directory.
const LAUNCHER_DIR: &str = "TuiCraft";

const LIBRARIES: &str = "libraries";
const ASSETS: &str = "assets";
const INSTANCES: &str = "instances";
const CONFIG_FILE: &str = "config.json";

/// Get the base launcher directory (`TuiCraft`) in the platform data location.
#[inline]
pub fn get_launcher_dir() -> Result<PathBuf> {
    let base_dir = match std::env::consts::OS {
        "windows" => std::env::var("APPDATA")
            .ok()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("Could not determine AppData directory"))?,
        "macos" => std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?,
        _ => std::env::var("XDG_DATA_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".local/share"))
            })
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?,
    };
    Ok(base_dir.join(LAUNCHER_DIR))
}

/// Gets the classpath separator for the current platform.
#[inline]
pub const fn get_classpath_separator() -> &'static str {
    if cfg!(windows) { ";" } else { ":" }
}

/// Layout of a TuiCraft home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    home: PathBuf,
}

impl LauncherPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.home.join(LIBRARIES)
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.home.join(INSTANCES)
    }

    /// Folder holding the client jar and every library jar of `version`.
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.libraries_dir().join(version)
    }

    pub fn client_jar(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(format!("{version}.jar"))
    }

    pub fn assets_dir(&self, version: &str) -> PathBuf {
        self.home.join(ASSETS).join(version)
    }

    /// Create the top-level folders of the home directory.
    pub async fn ensure_layout(&self) -> crate::Result<()> {
        for dir in [
            self.home.clone(),
            self.libraries_dir(),
            self.home.join(ASSETS),
            self.instances_dir(),
        ] {
            ensure_directory(&dir).await?;
        }
        Ok(())
    }

    /// Whether the client jar of `version` is present.
    pub async fn is_version_installed(&self, version: &str) -> bool {
        fs::try_exists(self.client_jar(version))
            .await
            .unwrap_or(false)
    }

    /// Versions whose folder under `libraries/` contains their client jar, sorted.
    pub async fn installed_versions(&self) -> crate::Result<Vec<String>> {
        let libraries = self.libraries_dir();
        let mut entries = match fs::read_dir(&libraries).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No libraries directory at {libraries:?}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::storage(&libraries, e)),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::storage(&libraries, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if self.is_version_installed(&name).await {
                versions.push(name);
            }
        }

        versions.sort();
        Ok(versions)
    }
}
