//! Logging setup.

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the global logger from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// `verbose` raises the fallback to `info` for this crate.
pub fn init_from_env(verbose: bool) {
    let fallback = if verbose {
        "warn,tuicraft=info"
    } else {
        DEFAULT_FILTER
    };

    // A second init (tests, repeated calls) is not an error worth surfacing
    let _ = Builder::from_env(Env::default().default_filter_or(fallback))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
