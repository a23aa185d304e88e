//! Core services.

pub mod instance;
pub mod launcher;

pub use instance::{Instance, InstanceSettings, InstanceStore};
pub use launcher::{LaunchHandle, LauncherService};
