use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select};

/// How an inline message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

/// Everything the menu needs from the terminal.
///
/// `select` returns `None` when the user backs out of the list.
pub trait Prompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>>;
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
    fn message(&mut self, tone: Tone, text: &str);
}

/// Prompter backed by `dialoguer` widgets on the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        Ok(Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()?)
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn message(&mut self, tone: Tone, text: &str) {
        match tone {
            Tone::Plain => println!("{text}"),
            Tone::Success => println!("{}", style(text).green()),
            Tone::Warning => println!("{}", style(text).yellow()),
            Tone::Error => println!("{}", style(text).red().bold()),
        }
    }
}
