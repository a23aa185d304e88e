//! Interactive menu: render the instance list, ask for an action, dispatch it, repeat.

use anyhow::Result;
use console::style;
use log::warn;

use super::prompt::{Prompter, Tone};
use crate::backend::services::{Instance, InstanceSettings, InstanceStore, LauncherService};

const BANNER: &str = r"
  _____     _  ___           __ _
 |_   _|  _(_)/ __|_ _ __ _ / _| |_
   | || || | | (__| '_/ _` |  _|  _|
   |_| \_,_|_|\___|_| \__,_|_|  \__|
";

const OTHER_VERSION: &str = "Other version...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Launch,
    Create,
    Refresh,
    SetUsername,
    Delete,
    About,
    Exit,
}

impl MenuAction {
    pub const ALL: [Self; 7] = [
        Self::Launch,
        Self::Create,
        Self::Refresh,
        Self::SetUsername,
        Self::Delete,
        Self::About,
        Self::Exit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Launch => "Launch instance",
            Self::Create => "New instance",
            Self::Refresh => "Refresh instances",
            Self::SetUsername => "Set username",
            Self::Delete => "Delete instance",
            Self::About => "About",
            Self::Exit => "Exit",
        }
    }
}

/// The menu borrows the store for its whole run; nothing else writes to it meanwhile.
pub struct Menu<'a, P: Prompter> {
    store: &'a mut InstanceStore,
    launcher: &'a LauncherService,
    prompter: P,
}

impl<'a, P: Prompter> Menu<'a, P> {
    pub fn new(store: &'a mut InstanceStore, launcher: &'a LauncherService, prompter: P) -> Self {
        Self {
            store,
            launcher,
            prompter,
        }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Runs until the user picks Exit.
    ///
    /// Failed actions are reported inline and the loop goes on; only terminal errors
    /// (for example a closed input stream) end it early.
    pub async fn run(&mut self) -> Result<()> {
        self.prompter.message(Tone::Plain, BANNER);

        let labels: Vec<String> = MenuAction::ALL
            .iter()
            .map(|action| action.label().to_string())
            .collect();

        loop {
            self.render_instances().await;

            let Some(index) = self
                .prompter
                .select("What would you like to do?", &labels, 0)?
            else {
                continue;
            };

            let action = MenuAction::ALL[index];
            if action == MenuAction::Exit {
                self.prompter.message(Tone::Plain, "Goodbye!");
                return Ok(());
            }

            if let Err(e) = self.dispatch(action).await {
                match e.downcast::<crate::Error>() {
                    Ok(action_error) => {
                        warn!("{} failed: {action_error}", action.label());
                        self.prompter.message(Tone::Error, &action_error.to_string());
                    }
                    Err(terminal_error) => return Err(terminal_error),
                }
            }
        }
    }

    pub async fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::Launch => self.launch().await,
            MenuAction::Create => self.create().await,
            MenuAction::Refresh => self.refresh().await,
            MenuAction::SetUsername => self.set_username().await,
            MenuAction::Delete => self.delete().await,
            MenuAction::About => {
                self.about();
                Ok(())
            }
            MenuAction::Exit => Ok(()),
        }
    }

    async fn render_instances(&mut self) {
        let instances = match self.store.list().await {
            Ok(instances) => instances,
            Err(e) => {
                self.prompter.message(Tone::Error, &e.to_string());
                return;
            }
        };

        self.prompter
            .message(Tone::Plain, &style("Instances").bold().to_string());
        if instances.is_empty() {
            self.prompter
                .message(Tone::Plain, "  (none yet, pick \"New instance\")");
            return;
        }

        for instance in &instances {
            let installed = self
                .store
                .paths()
                .is_version_installed(&instance.version)
                .await;
            let line = format!(
                "  {} {:<24} {:<12} [{}]{}",
                style("•").cyan(),
                instance.name,
                instance.version,
                instance.username,
                if installed { "" } else { "  (not installed)" }
            );
            self.prompter.message(Tone::Plain, &line);
        }
    }

    async fn launch(&mut self) -> Result<()> {
        let Some(name) = self.pick_instance("Launch which instance?").await? else {
            return Ok(());
        };

        let handle = self.launcher.launch(&*self.store, &name).await?;
        let pid = handle
            .pid()
            .map_or_else(|| "unknown".to_string(), |pid| pid.to_string());
        self.prompter.message(
            Tone::Success,
            &format!("Launched {name} (PID {pid}). The menu stays available."),
        );
        Ok(())
    }

    async fn create(&mut self) -> Result<()> {
        let name = self.prompter.input("Instance name", None)?;
        if name.is_empty() {
            self.prompter.message(Tone::Warning, "Creation cancelled");
            return Ok(());
        }

        let version = self.pick_version().await?;
        if version.is_empty() {
            self.prompter.message(Tone::Warning, "Creation cancelled");
            return Ok(());
        }

        let default_username = self.launcher.config().default_username.clone();
        let username = self
            .prompter
            .input("Username", Some(default_username.as_str()))?;

        let instance = self
            .store
            .create(
                &name,
                &version,
                InstanceSettings {
                    username: Some(username),
                    memory: None,
                },
            )
            .await?;

        self.prompter.message(
            Tone::Success,
            &format!("Created {} ({})", instance.name, instance.version),
        );
        if !self.store.paths().is_version_installed(&version).await {
            let dir = self.store.paths().version_dir(&version);
            self.prompter.message(
                Tone::Warning,
                &format!(
                    "Minecraft {version} is not installed. Put its client jar and libraries in {} before launching.",
                    dir.display()
                ),
            );
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let found = self.store.refresh().await?;
        self.prompter
            .message(Tone::Success, &format!("Instances refreshed: {found} found"));
        Ok(())
    }

    async fn set_username(&mut self) -> Result<()> {
        let Some(name) = self.pick_instance("Change the username of which instance?").await?
        else {
            return Ok(());
        };
        let current = self.store.get(&name)?.username.clone();
        let username = self.prompter.input("Username", Some(current.as_str()))?;

        let updated = self.store.set_username(&name, &username).await?;
        let message = format!("{} now plays as {}", updated.name, updated.username);
        self.prompter.message(Tone::Success, &message);
        Ok(())
    }

    async fn delete(&mut self) -> Result<()> {
        let Some(name) = self.pick_instance("Delete which instance?").await? else {
            return Ok(());
        };

        let prompt = format!("Delete {name} and all of its worlds?");
        if !self.prompter.confirm(&prompt, false)? {
            self.prompter.message(Tone::Warning, "Deletion cancelled");
            return Ok(());
        }

        self.store.delete(&name).await?;
        self.prompter
            .message(Tone::Success, &format!("Deleted {name}"));
        Ok(())
    }

    fn about(&mut self) {
        let text = format!(
            "TuiCraft {}\nA terminal front end for offline Minecraft instances.\nHome: {}",
            env!("CARGO_PKG_VERSION"),
            self.store.paths().home().display()
        );
        self.prompter.message(Tone::Plain, &text);
    }

    async fn pick_instance(&mut self, prompt: &str) -> Result<Option<String>> {
        let instances: Vec<Instance> = self.store.list().await?;
        if instances.is_empty() {
            self.prompter
                .message(Tone::Warning, "No instances yet. Create one first.");
            return Ok(None);
        }

        let items: Vec<String> = instances
            .iter()
            .map(|i| format!("{} ({})", i.name, i.version))
            .collect();
        Ok(self
            .prompter
            .select(prompt, &items, 0)?
            .map(|index| instances[index].name.clone()))
    }

    /// Offers installed versions first; any other id can be typed in.
    async fn pick_version(&mut self) -> Result<String> {
        let mut items = self.store.paths().installed_versions().await?;
        if items.is_empty() {
            return self.prompter.input("Minecraft version (e.g. 1.20.1)", None);
        }

        items.push(OTHER_VERSION.to_string());
        match self.prompter.select("Minecraft version", &items, 0)? {
            Some(index) if items[index] != OTHER_VERSION => Ok(items.swap_remove(index)),
            Some(_) => self.prompter.input("Minecraft version", None),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::utils::config::AppConfig;
    use crate::backend::utils::paths::LauncherPaths;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    enum Answer {
        Select(Option<usize>),
        Input(&'static str),
        Confirm(bool),
    }

    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        messages: Vec<(Tone, String)>,
    }

    impl ScriptedPrompter {
        fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                messages: Vec::new(),
            }
        }

        fn errors(&self) -> Vec<&str> {
            self.messages
                .iter()
                .filter(|(tone, _)| *tone == Tone::Error)
                .map(|(_, text)| text.as_str())
                .collect()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(&mut self, _: &str, items: &[String], _: usize) -> Result<Option<usize>> {
            match self.answers.pop_front() {
                Some(Answer::Select(choice)) => {
                    assert!(choice.is_none_or(|i| i < items.len()));
                    Ok(choice)
                }
                _ => anyhow::bail!("script expected a selection"),
            }
        }

        fn input(&mut self, _: &str, default: Option<&str>) -> Result<String> {
            match self.answers.pop_front() {
                Some(Answer::Input("")) => Ok(default.unwrap_or_default().to_string()),
                Some(Answer::Input(text)) => Ok(text.to_string()),
                _ => anyhow::bail!("script expected an input"),
            }
        }

        fn confirm(&mut self, _: &str, _: bool) -> Result<bool> {
            match self.answers.pop_front() {
                Some(Answer::Confirm(yes)) => Ok(yes),
                _ => anyhow::bail!("script expected a confirmation"),
            }
        }

        fn message(&mut self, tone: Tone, text: &str) {
            self.messages.push((tone, text.to_string()));
        }
    }

    fn index_of(action: MenuAction) -> Answer {
        let index = MenuAction::ALL.iter().position(|a| *a == action).unwrap();
        Answer::Select(Some(index))
    }

    async fn setup(home: &TempDir) -> (InstanceStore, LauncherService) {
        let paths = LauncherPaths::new(home.path());
        paths.ensure_layout().await.unwrap();
        let store = InstanceStore::open(paths.clone()).await.unwrap();
        (store, LauncherService::new(paths, AppConfig::default()))
    }

    #[tokio::test]
    async fn failed_actions_do_not_end_the_loop() {
        let home = TempDir::new().unwrap();
        let (mut store, launcher) = setup(&home).await;
        store
            .create("Survival", "1.20.1", InstanceSettings::default())
            .await
            .unwrap();

        let prompter = ScriptedPrompter::new([
            // Launch fails: 1.20.1 is not installed
            index_of(MenuAction::Launch),
            Answer::Select(Some(0)),
            // Duplicate name
            index_of(MenuAction::Create),
            Answer::Input("Survival"),
            Answer::Input("1.20.1"),
            Answer::Input(""),
            index_of(MenuAction::Exit),
        ]);

        let mut menu = Menu::new(&mut store, &launcher, prompter);
        menu.run().await.unwrap();
        let prompter = menu.into_prompter();

        let errors = prompter.errors();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].contains("failed to launch"));
        assert!(errors[1].contains("already exists"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_then_delete_through_menu() {
        let home = TempDir::new().unwrap();
        let (mut store, launcher) = setup(&home).await;

        let prompter = ScriptedPrompter::new([
            index_of(MenuAction::Create),
            Answer::Input("Creative"),
            Answer::Input("1.20.1"),
            Answer::Input("Alex"),
            index_of(MenuAction::Delete),
            Answer::Select(Some(0)),
            Answer::Confirm(false),
            index_of(MenuAction::Exit),
        ]);

        let mut menu = Menu::new(&mut store, &launcher, prompter);
        menu.run().await.unwrap();
        assert!(menu.into_prompter().errors().is_empty());

        let created = store.get("Creative").unwrap();
        assert_eq!(created.version, "1.20.1");
        assert_eq!(created.username, "Alex");

        let prompter = ScriptedPrompter::new([
            index_of(MenuAction::Delete),
            Answer::Select(Some(0)),
            Answer::Confirm(true),
            index_of(MenuAction::Exit),
        ]);
        Menu::new(&mut store, &launcher, prompter).run().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn installed_versions_are_offered_first() {
        let home = TempDir::new().unwrap();
        let (mut store, launcher) = setup(&home).await;
        let paths = store.paths().clone();
        std::fs::create_dir_all(paths.version_dir("1.20.1")).unwrap();
        std::fs::write(paths.client_jar("1.20.1"), b"").unwrap();

        let prompter = ScriptedPrompter::new([
            index_of(MenuAction::Create),
            Answer::Input("Modern"),
            Answer::Select(Some(0)),
            Answer::Input(""),
            index_of(MenuAction::Exit),
        ]);
        Menu::new(&mut store, &launcher, prompter).run().await.unwrap();

        let created = store.get("Modern").unwrap();
        assert_eq!(created.version, "1.20.1");
        assert_eq!(created.username, "User");
    }

    #[tokio::test]
    async fn closed_input_ends_the_loop_with_error() {
        let home = TempDir::new().unwrap();
        let (mut store, launcher) = setup(&home).await;

        let prompter = ScriptedPrompter::new([index_of(MenuAction::About)]);
        let result = Menu::new(&mut store, &launcher, prompter).run().await;

        assert!(result.is_err());
    }
}
