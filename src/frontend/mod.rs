//! Terminal frontend.

pub mod cli;
