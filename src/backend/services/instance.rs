//! Instance management service.
//!
//! Every instance lives in its own folder under `instances/`, named after the instance and
//! holding an `instance.json` descriptor next to the `.minecraft` game directory. The folder
//! name is the key: it is what `get`, `delete` and the launcher look up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::backend::utils::config::MemoryConfig;
use crate::backend::utils::file_utils::{ensure_directory, remove_dir_if_exists, write_atomic};
use crate::backend::utils::paths::LauncherPaths;
use crate::utils::{Error, Result};

pub const DESCRIPTOR_FILE: &str = "instance.json";
pub const GAME_DIR: &str = ".minecraft";
pub const DEFAULT_USERNAME: &str = "User";

const MAX_NAME_LEN: usize = 64;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ._-]+$").expect("valid name pattern"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,16}$").expect("valid username pattern"));
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._+-]{0,63}$").expect("valid version pattern")
});

// Device names Windows refuses as folder names, whatever the extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub version: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryConfig>,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

/// Optional settings for a new instance.
#[derive(Debug, Clone, Default)]
pub struct InstanceSettings {
    pub username: Option<String>,
    pub memory: Option<MemoryConfig>,
}

/// Durable mapping from instance name to instance record.
pub struct InstanceStore {
    paths: LauncherPaths,
    instances: HashMap<String, Instance>,
}

impl InstanceStore {
    /// Open the store under `paths` and scan it once.
    pub async fn open(paths: LauncherPaths) -> Result<Self> {
        ensure_directory(paths.instances_dir()).await?;

        let mut store = Self {
            paths,
            instances: HashMap::new(),
        };
        store.refresh().await?;
        Ok(store)
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    /// All known instances, oldest first.
    pub async fn list(&self) -> Result<Vec<Instance>> {
        let dir = self.paths.instances_dir();
        fs::read_dir(&dir)
            .await
            .map_err(|e| Error::storage(&dir, e))?;

        let mut instances: Vec<Instance> = self.instances.values().cloned().collect();
        instances.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(instances)
    }

    pub fn get(&self, name: &str) -> Result<&Instance> {
        self.instances
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instance_dir(&self, name: &str) -> PathBuf {
        self.paths.instances_dir().join(name)
    }

    /// The `.minecraft` directory the game runs in.
    pub fn game_dir(&self, name: &str) -> PathBuf {
        self.instance_dir(name).join(GAME_DIR)
    }

    /// Create and persist a new instance.
    pub async fn create(
        &mut self,
        name: &str,
        version: &str,
        settings: InstanceSettings,
    ) -> Result<Instance> {
        validate_name(name)?;
        validate_version(version)?;
        let username = settings.username.unwrap_or_else(default_username);
        validate_username(&username)?;

        if let Some(existing) = self.find_ignore_case(name) {
            return Err(Error::DuplicateName(existing.name.clone()));
        }

        // A folder may have appeared since the last refresh
        let instance_dir = self.instance_dir(name);
        if fs::try_exists(&instance_dir)
            .await
            .map_err(|e| Error::storage(&instance_dir, e))?
        {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let instance = Instance {
            name: name.to_string(),
            version: version.to_string(),
            username,
            created_at: Utc::now(),
            memory: settings.memory,
        };

        if let Err(e) = self.write_new_instance(&instance).await {
            if let Err(cleanup) = remove_dir_if_exists(&instance_dir).await {
                warn!("Failed to clean up {instance_dir:?}: {cleanup}");
            }
            return Err(e);
        }

        if !self.paths.is_version_installed(version).await {
            warn!("Instance {name} uses version {version}, which is not installed yet");
        }

        info!("Created instance {name} with version {version}");
        self.instances.insert(instance.name.clone(), instance.clone());
        Ok(instance)
    }

    /// Delete an instance and everything in its folder.
    pub async fn delete(&mut self, name: &str) -> Result<Instance> {
        self.get(name)?;

        let instance_dir = self.instance_dir(name);
        remove_dir_if_exists(&instance_dir).await?;
        info!("Deleted instance {name} at {instance_dir:?}");

        self.instances
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Change the offline player name of an instance.
    pub async fn set_username(&mut self, name: &str, username: &str) -> Result<&Instance> {
        validate_username(username)?;

        let mut updated = self.get(name)?.clone();
        updated.username = username.to_string();

        let instance_dir = self.instance_dir(name);
        if !fs::try_exists(&instance_dir).await.unwrap_or(false) {
            return Err(Error::NotFound(name.to_string()));
        }
        write_descriptor(&instance_dir, &updated).await?;

        debug!("Instance {name} now plays as {username}");
        let slot = self
            .instances
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        *slot = updated;
        Ok(&*slot)
    }

    /// Rescan the instances directory and replace the in-memory view with what is on disk.
    ///
    /// Returns the number of instances found. Unreadable descriptors and stray files are
    /// skipped; only a failure to read the directory itself is an error.
    pub async fn refresh(&mut self) -> Result<usize> {
        let dir = self.paths.instances_dir();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::storage(&dir, e))?;

        let mut scanned = HashMap::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::storage(&dir, e))?
        {
            let path = entry.path();
            let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
            if !is_dir {
                debug!("Skipping non-directory {path:?}");
                continue;
            }
            let Some(folder) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping instance folder with a non UTF-8 name: {path:?}");
                continue;
            };

            if let Some(instance) = self.load_folder(&folder, &path).await {
                scanned.insert(folder, instance);
            }
        }

        self.instances = scanned;
        info!("Found {} instances in {dir:?}", self.instances.len());
        Ok(self.instances.len())
    }

    async fn load_folder(&self, folder: &str, path: &Path) -> Option<Instance> {
        let descriptor = path.join(DESCRIPTOR_FILE);
        match read_descriptor(&descriptor).await {
            Ok(Some(mut instance)) => {
                if instance.name != folder {
                    warn!(
                        "Descriptor in {path:?} names \"{}\", using folder name \"{folder}\"",
                        instance.name
                    );
                    instance.name = folder.to_string();
                }
                if let Err(e) = validate_name(&instance.name)
                    .and_then(|_| validate_version(&instance.version))
                    .and_then(|_| validate_username(&instance.username))
                {
                    warn!("Skipping {path:?}: {e}");
                    return None;
                }
                Some(instance)
            }
            Ok(None) if self.paths.is_version_installed(folder).await => {
                debug!("Adopting version folder {path:?} as an instance");
                Some(Instance {
                    name: folder.to_string(),
                    version: folder.to_string(),
                    username: default_username(),
                    created_at: folder_timestamp(path).await,
                    memory: None,
                })
            }
            Ok(None) => {
                debug!("Skipping {path:?}: no {DESCRIPTOR_FILE}");
                None
            }
            Err(e) => {
                warn!("Skipping {path:?}: {e}");
                None
            }
        }
    }

    async fn write_new_instance(&self, instance: &Instance) -> Result<()> {
        let instance_dir = self.instance_dir(&instance.name);
        ensure_directory(instance_dir.join(GAME_DIR)).await?;
        write_descriptor(&instance_dir, instance).await
    }

    fn find_ignore_case(&self, name: &str) -> Option<&Instance> {
        self.instances
            .values()
            .find(|instance| instance.name.eq_ignore_ascii_case(name))
    }
}

async fn read_descriptor(path: &Path) -> Result<Option<Instance>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::storage(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::serialization(path, e))
}

async fn write_descriptor(instance_dir: &Path, instance: &Instance) -> Result<()> {
    let path = instance_dir.join(DESCRIPTOR_FILE);
    let json = serde_json::to_string_pretty(instance).map_err(|e| Error::serialization(&path, e))?;
    write_atomic(&path, json.as_bytes()).await
}

async fn folder_timestamp(path: &Path) -> DateTime<Utc> {
    fs::metadata(path)
        .await
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Checks that `name` can be used as an instance folder name.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::invalid_name(name, reason));

    if name.is_empty() {
        return invalid("name must not be empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return invalid("name must be at most 64 characters");
    }
    if name.trim() != name {
        return invalid("name must not start or end with spaces");
    }
    if name.starts_with('.') || name.ends_with('.') {
        return invalid("name must not start or end with a dot");
    }
    if !NAME_RE.is_match(name) {
        return invalid("use only letters, digits, spaces, '.', '_' and '-'");
    }
    let stem = name.split('.').next().unwrap_or(name);
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        return invalid("name is reserved by the operating system");
    }
    Ok(())
}

/// Checks an offline player name.
pub fn validate_username(username: &str) -> Result<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(Error::invalid_name(
            username,
            "usernames are 3-16 letters, digits or '_'",
        ))
    }
}

/// Checks that a version id is safe to use as a folder name.
pub fn validate_version(version: &str) -> Result<()> {
    if VERSION_RE.is_match(version) && version.trim_end() == version {
        Ok(())
    } else {
        Err(Error::invalid_name(version, "not a valid version id"))
    }
}
