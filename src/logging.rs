//! Logging setup
//!
//! Both binaries log through `env_logger`; `RUST_LOG` overrides the default
//! filter.

use env_logger::Env;

/// Initialize logging with `default_filter` unless `RUST_LOG` is set.
pub fn init(default_filter: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}
