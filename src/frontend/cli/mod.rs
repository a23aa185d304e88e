//! Command-line interface and interactive menu.
/// Entry point of CLI.
pub mod main;
/// Command-line arguments.
pub mod models;
/// Input seam between the menu and the terminal.
pub mod prompt;
/// Interactive menu.
pub mod selector;
