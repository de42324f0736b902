//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Logger builder that uses `default` unless `RUST_LOG` overrides it
fn builder(default: log::LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default).parse_default_env();
    builder
}

/// Initialize the logging system
///
/// Honours `RUST_LOG` and falls back to `info` when it is unset.
pub fn init() {
    builder(log::LevelFilter::Info).init();
}

/// Initialize logging for tests; safe to call more than once
pub fn init_for_tests() {
    let _ = builder(log::LevelFilter::Debug).is_test(true).try_init();
}
