//! Launcher service for starting Minecraft instances.

use std::process::ExitStatus;

use log::{Level, debug, error, info, warn};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

use crate::backend::services::instance::{Instance, InstanceStore};
use crate::backend::utils::command::{CommandConfig, LaunchCommand};
use crate::backend::utils::config::AppConfig;
use crate::backend::utils::file_utils::{collect_files_with_extension, ensure_directory};
use crate::backend::utils::paths::LauncherPaths;
use crate::utils::{Error, Result};

/// Builds launch commands from instance records and starts the game.
#[derive(Debug, Clone)]
pub struct LauncherService {
    paths: LauncherPaths,
    config: AppConfig,
}

/// A running game started by [`LauncherService::launch`].
///
/// Dropping the handle leaves the game running; its output keeps being forwarded to the log.
#[derive(Debug)]
pub struct LaunchHandle {
    name: String,
    pid: Option<u32>,
    command: LaunchCommand,
    monitor: JoinHandle<std::io::Result<ExitStatus>>,
}

impl LaunchHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    /// Wait for the game to exit.
    pub async fn wait(self) -> Result<ExitStatus> {
        match self.monitor.await {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(e)) => Err(Error::launch(&self.name, format!("lost the game process: {e}"))),
            Err(e) => Err(Error::launch(&self.name, format!("monitor task failed: {e}"))),
        }
    }
}

impl LauncherService {
    pub fn new(paths: LauncherPaths, config: AppConfig) -> Self {
        Self { paths, config }
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve everything the game needs for `instance` into a command.
    ///
    /// Requires `libraries/<version>/<version>.jar`; every jar below the version folder goes
    /// on the classpath. Creates the game and assets directories when missing.
    pub async fn build_command(
        &self,
        store: &InstanceStore,
        instance: &Instance,
    ) -> Result<LaunchCommand> {
        let version = &instance.version;
        let version_dir = self.paths.version_dir(version);

        if !fs::metadata(&version_dir)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(Error::launch(
                &instance.name,
                format!("version folder not found: {}", version_dir.display()),
            ));
        }

        let client_jar = self.paths.client_jar(version);
        if !fs::try_exists(&client_jar).await.unwrap_or(false) {
            return Err(Error::launch(
                &instance.name,
                format!("client jar not found: {}", client_jar.display()),
            ));
        }

        let classpath = collect_files_with_extension(&version_dir, "jar").await?;
        debug!("Classpath for {version} has {} jars", classpath.len());

        let game_dir = store.game_dir(&instance.name);
        let assets_dir = self.paths.assets_dir(version);
        ensure_directory(&game_dir).await?;
        ensure_directory(&assets_dir).await?;

        let memory = instance
            .memory
            .clone()
            .unwrap_or_else(|| self.config.memory.clone());

        Ok(LaunchCommand::new(CommandConfig {
            java_path: self.config.java_path.clone(),
            game_dir,
            assets_dir,
            version: version.clone(),
            username: instance.username.clone(),
            min_memory: memory.min,
            max_memory: memory.max,
            classpath,
            jvm_args: self.config.jvm_args.clone(),
            game_args: self.config.game_args.clone(),
        }))
    }

    /// Start the game for the instance called `name` without waiting for it.
    ///
    /// Never touches the store: an unknown instance, a missing version or an executable that
    /// cannot be started all surface as [`Error::Launch`].
    pub async fn launch(&self, store: &InstanceStore, name: &str) -> Result<LaunchHandle> {
        let instance = store
            .get(name)
            .map_err(|_| Error::launch(name, "no such instance"))?;

        info!("Launching {name} (Minecraft {})", instance.version);
        let command = self.build_command(store, instance).await?;
        debug!("Full command: {}", command.display());

        let mut child = command.to_command().spawn().map_err(|e| {
            Error::launch(
                name,
                format!("could not start {}: {e}", command.program().display()),
            )
        })?;

        let pid = child.id();
        info!("Minecraft process for {name} started with PID: {pid:?}");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let monitor = tokio::spawn(async move {
            let out = stdout.map(|s| tokio::spawn(forward_lines(s)));
            let err = stderr.map(|s| tokio::spawn(forward_lines(s)));

            let status = child.wait().await;
            for task in [out, err].into_iter().flatten() {
                let _ = task.await;
            }
            status
        });

        Ok(LaunchHandle {
            name: name.to_string(),
            pid,
            command,
            monitor,
        })
    }
}

async fn forward_lines<R>(stream: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line_level(&line) {
            Level::Error => error!("MC: {line}"),
            Level::Warn => warn!("MC: {line}"),
            _ => debug!("MC: {line}"),
        }
    }
}

/// Log level for one line of game output, judged by its content only.
fn line_level(line: &str) -> Level {
    if line.contains("ERROR") || line.contains("FATAL") {
        Level::Error
    } else if line.contains("WARN") {
        Level::Warn
    } else {
        Level::Debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::services::instance::InstanceSettings;
    use tempfile::TempDir;

    #[test]
    fn game_output_level_follows_line_content() {
        assert_eq!(line_level("[Render thread/ERROR]: Failed to load"), Level::Error);
        assert_eq!(line_level("FATAL crash"), Level::Error);
        assert_eq!(line_level("[main/WARN]: Missing sound"), Level::Warn);
        assert_eq!(line_level("Exception in thread main"), Level::Debug);
        assert_eq!(line_level("[main/INFO]: Setting user: Steve"), Level::Debug);
    }

    fn install_version(paths: &LauncherPaths, version: &str) {
        let lib_dir = paths.version_dir(version).join("org/lwjgl/lwjgl/3.3.1");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(paths.client_jar(version), b"").unwrap();
        std::fs::write(lib_dir.join("lwjgl-3.3.1.jar"), b"").unwrap();
    }

    #[tokio::test]
    async fn instance_memory_overrides_config() {
        let home = TempDir::new().unwrap();
        let paths = LauncherPaths::new(home.path());
        install_version(&paths, "1.20.1");
        let mut store = InstanceStore::open(paths.clone()).await.unwrap();
        let instance = store
            .create(
                "Heavy",
                "1.20.1",
                InstanceSettings {
                    username: None,
                    memory: Some(crate::backend::utils::config::MemoryConfig {
                        min: "2G".to_string(),
                        max: "6G".to_string(),
                    }),
                },
            )
            .await
            .unwrap();

        let launcher = LauncherService::new(paths, AppConfig::default());
        let command = launcher.build_command(&store, &instance).await.unwrap();

        assert_eq!(&command.args()[..2], &["-Xmx6G", "-Xms2G"]);
    }

    #[tokio::test]
    async fn classpath_holds_client_and_libraries() {
        let home = TempDir::new().unwrap();
        let paths = LauncherPaths::new(home.path());
        install_version(&paths, "1.20.1");
        let mut store = InstanceStore::open(paths.clone()).await.unwrap();
        let instance = store
            .create("Survival", "1.20.1", InstanceSettings::default())
            .await
            .unwrap();

        let launcher = LauncherService::new(paths.clone(), AppConfig::default());
        let command = launcher.build_command(&store, &instance).await.unwrap();

        let cp_index = command.args().iter().position(|a| a == "-cp").unwrap();
        let classpath = &command.args()[cp_index + 1];
        assert!(classpath.contains("1.20.1.jar"));
        assert!(classpath.contains("lwjgl-3.3.1.jar"));
        assert!(paths.assets_dir("1.20.1").is_dir());
    }
}
