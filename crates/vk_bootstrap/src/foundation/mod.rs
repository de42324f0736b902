//! Foundation module - shared utilities
//!
//! Currently only the logging setup used by the binaries and tests.

pub mod logging;
