use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use log::info;

use super::models::{Cli, Commands};
use super::prompt::TerminalPrompter;
use super::selector::Menu;
use crate::backend::services::{InstanceSettings, InstanceStore, LauncherService};
use crate::backend::utils::config::AppConfig;
use crate::backend::utils::paths::{LauncherPaths, get_launcher_dir};

/// Resolve the home directory, load config and store, then run the requested command.
pub async fn run(cli: Cli) -> Result<()> {
    let home = match cli.home {
        Some(home) => home,
        None => get_launcher_dir()?,
    };
    let paths = LauncherPaths::new(home);
    paths
        .ensure_layout()
        .await
        .with_context(|| format!("preparing {}", paths.home().display()))?;

    let config = AppConfig::load_or_create(&paths.config_path()).await?;
    info!("Using TuiCraft home {:?}", paths.home());

    let launcher = LauncherService::new(paths.clone(), config);
    let mut store = InstanceStore::open(paths).await?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_interactive(&mut store, &launcher).await,
        Commands::List => list_instances(&store).await,
        Commands::Create {
            name,
            version,
            username,
        } => {
            let username =
                username.unwrap_or_else(|| launcher.config().default_username.clone());
            let instance = store
                .create(
                    &name,
                    &version,
                    InstanceSettings {
                        username: Some(username),
                        memory: None,
                    },
                )
                .await?;
            println!(
                "{}",
                style(format!("Created {} ({})", instance.name, instance.version)).green()
            );
            Ok(())
        }
        Commands::Launch { name } => {
            let handle = launcher.launch(&store, &name).await?;
            println!("Started {name}, waiting for the game to exit...");
            let status = handle.wait().await?;
            if status.success() {
                println!("Minecraft exited successfully");
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "Minecraft process failed with code: {:?}",
                    status.code()
                ))
            }
        }
        Commands::Delete { name, yes } => {
            store.get(&name)?;
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete {name} and all of its worlds?"))
                    .default(false)
                    .interact()?
            {
                println!("{}", style("Deletion cancelled").yellow());
                return Ok(());
            }
            store.delete(&name).await?;
            println!("{}", style(format!("Deleted {name}")).green());
            Ok(())
        }
        Commands::Versions => {
            let versions = launcher.paths().installed_versions().await?;
            if versions.is_empty() {
                println!(
                    "No versions installed under {}",
                    launcher.paths().libraries_dir().display()
                );
            }
            for version in versions {
                println!("{version}");
            }
            Ok(())
        }
    }
}

pub async fn run_interactive(store: &mut InstanceStore, launcher: &LauncherService) -> Result<()> {
    println!("{}", style("TuiCraft").bold().green());
    Menu::new(store, launcher, TerminalPrompter).run().await
}

async fn list_instances(store: &InstanceStore) -> Result<()> {
    let instances = store.list().await?;
    if instances.is_empty() {
        println!("No instances yet");
        return Ok(());
    }

    for instance in instances {
        println!(
            "{:<24} {:<12} {:<16} {}",
            instance.name,
            instance.version,
            instance.username,
            instance.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
