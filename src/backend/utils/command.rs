//! Minecraft command building utilities.
//!
//! Turns a resolved instance into the Java invocation that starts the client in offline
//! mode: heap bounds, classpath, the client main class and the game arguments.
//!
//! #### Example:
//! ```rust
//! use std::path::PathBuf;
//! use tuicraft::backend::utils::command::{CommandConfig, LaunchCommand};
//!
//! let command = LaunchCommand::new(CommandConfig {
//!     java_path: PathBuf::from("java"),
//!     game_dir: PathBuf::from("/data/TuiCraft/instances/Survival/.minecraft"),
//!     assets_dir: PathBuf::from("/data/TuiCraft/assets/1.20.1"),
//!     version: "1.20.1".to_string(),
//!     username: "User".to_string(),
//!     min_memory: "1G".to_string(),
//!     max_memory: "2G".to_string(),
//!     classpath: vec![PathBuf::from("/data/TuiCraft/libraries/1.20.1/1.20.1.jar")],
//!     jvm_args: Vec::new(),
//!     game_args: Vec::new(),
//! });
//! assert!(command.args().contains(&"--version=1.20.1".to_string()));
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::paths::get_classpath_separator;

/// Entry point of the vanilla client.
pub const MAIN_CLASS: &str = "net.minecraft.client.main.Main";
/// UUID used for every offline player.
pub const OFFLINE_UUID: &str = "00000000-0000-0000-0000-000000000000";
/// Access token accepted by the client in offline mode.
pub const OFFLINE_ACCESS_TOKEN: &str = "OFFLINE_ACCESS_TOKEN";
/// Value of `MINECRAFT_LAUNCHER` in the game's environment.
pub const LAUNCHER_BRAND: &str = "TuiCraft";

/// Everything needed to build a launch command for one instance.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub java_path: PathBuf,
    pub game_dir: PathBuf, // The instance's `.minecraft`, also the working directory
    pub assets_dir: PathBuf,
    pub version: String,
    pub username: String,
    pub min_memory: String,
    pub max_memory: String,
    pub classpath: Vec<PathBuf>,
    pub jvm_args: Vec<String>,  // Appended after the heap bounds
    pub game_args: Vec<String>, // Appended after the built-in game arguments
}

/// A fully resolved invocation of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: PathBuf,
    envs: Vec<(String, String)>,
}

impl LaunchCommand {
    pub fn new(config: CommandConfig) -> Self {
        let classpath = config
            .classpath
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(get_classpath_separator());

        let mut args = vec![
            format!("-Xmx{}", config.max_memory),
            format!("-Xms{}", config.min_memory),
        ];
        args.extend(config.jvm_args);
        args.push("-cp".to_string());
        args.push(classpath);
        args.push(MAIN_CLASS.to_string());

        args.extend([
            format!("--username={}", config.username),
            format!("--uuid={OFFLINE_UUID}"),
            format!("--accessToken={OFFLINE_ACCESS_TOKEN}"),
            format!("--version={}", config.version),
            format!("--gameDir={}", config.game_dir.display()),
            format!("--assetsDir={}", config.assets_dir.display()),
            "--userType=mojang".to_string(),
            format!("--assetIndex={}", config.version),
        ]);
        args.extend(config.game_args);

        Self {
            program: config.java_path,
            args,
            current_dir: config.game_dir,
            envs: vec![("MINECRAFT_LAUNCHER".to_string(), LAUNCHER_BRAND.to_string())],
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Value of a `--key=value` game argument.
    pub fn game_arg(&self, key: &str) -> Option<&str> {
        let prefix = format!("--{key}=");
        self.args.iter().find_map(|arg| arg.strip_prefix(&prefix))
    }

    /// Builds the process with stdout and stderr piped for log forwarding.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.current_dir)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Shell-style rendering for logs.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CommandConfig {
        CommandConfig {
            java_path: PathBuf::from("java"),
            game_dir: PathBuf::from("/home/TuiCraft/instances/Survival/.minecraft"),
            assets_dir: PathBuf::from("/home/TuiCraft/assets/1.20.1"),
            version: "1.20.1".to_string(),
            username: "Steve".to_string(),
            min_memory: "1G".to_string(),
            max_memory: "2G".to_string(),
            classpath: vec![PathBuf::from("a.jar"), PathBuf::from("b.jar")],
            jvm_args: vec!["-XX:+UseG1GC".to_string()],
            game_args: vec!["--demo".to_string()],
        }
    }

    #[test]
    fn jvm_arguments_precede_main_class() {
        let cmd = LaunchCommand::new(config());
        let args = cmd.args();
        let sep = get_classpath_separator();

        assert_eq!(&args[..3], &["-Xmx2G", "-Xms1G", "-XX:+UseG1GC"]);
        assert_eq!(args[3], "-cp");
        assert_eq!(args[4], format!("a.jar{sep}b.jar"));
        assert_eq!(args[5], MAIN_CLASS);
        assert_eq!(args.last().map(String::as_str), Some("--demo"));
    }

    #[test]
    fn game_arguments_carry_instance_values() {
        let cmd = LaunchCommand::new(config());

        assert_eq!(cmd.game_arg("version"), Some("1.20.1"));
        assert_eq!(cmd.game_arg("assetIndex"), Some("1.20.1"));
        assert_eq!(cmd.game_arg("username"), Some("Steve"));
        assert_eq!(cmd.game_arg("uuid"), Some(OFFLINE_UUID));
        assert_eq!(cmd.game_arg("userType"), Some("mojang"));
        assert_eq!(
            cmd.current_dir(),
            Path::new("/home/TuiCraft/instances/Survival/.minecraft")
        );
        assert_eq!(
            cmd.envs(),
            &[("MINECRAFT_LAUNCHER".to_string(), "TuiCraft".to_string())]
        );
    }
}
