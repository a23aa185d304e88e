//! TuiCraft: a terminal front end for offline Minecraft instances.
//!
//! The backend owns the on-disk instance store and the game launcher; the frontend is the
//! interactive menu and the command line around them.

pub mod backend;
pub mod frontend;
pub mod utils;

pub use utils::error::{Error, Result};
