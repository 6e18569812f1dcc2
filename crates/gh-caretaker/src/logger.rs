//! Logging to stderr using env_logger
//!
//! `RUST_LOG` wins when set, e.g. `RUST_LOG=gh_client=debug`. Otherwise
//! `--verbose` selects debug output and the default is info.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the global logger
pub fn init(verbose: bool) {
    let mut builder = Builder::new();
    builder
        .filter_level(default_level(verbose))
        .format_timestamp_secs()
        .target(Target::Stderr);

    // RUST_LOG is parsed last so it overrides the default level
    builder.parse_env(Env::default());

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), LevelFilter::Debug);
        assert_eq!(default_level(false), LevelFilter::Info);
    }
}
