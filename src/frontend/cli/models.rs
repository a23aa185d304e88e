use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tuicraft", version, about = "Create, manage and launch offline Minecraft instances")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// TuiCraft home directory (defaults to the platform data directory)
    #[arg(long, env = "TUICRAFT_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Log launcher activity at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,
    /// List instances
    List,
    /// Create a new instance
    Create {
        name: String,
        #[arg(long)]
        version: String,
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Launch an instance and wait for the game to exit
    Launch { name: String },
    /// Delete an instance and its files
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List installed Minecraft versions
    Versions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["tuicraft", "--home", "/tmp/tc"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/tc")));
    }

    #[test]
    fn create_takes_version_and_username() {
        let cli = Cli::try_parse_from([
            "tuicraft", "create", "Survival", "--version", "1.20.1", "-u", "Steve",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Create {
                name: "Survival".to_string(),
                version: "1.20.1".to_string(),
                username: Some("Steve".to_string()),
            })
        );
    }

    #[test]
    fn create_requires_version() {
        assert!(Cli::try_parse_from(["tuicraft", "create", "Survival"]).is_err());
    }
}
