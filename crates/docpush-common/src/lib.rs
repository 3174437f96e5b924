//! docpush common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the docpush workspace members. Today that is the
//! logging setup every binary runs before doing any work.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogLevel, LoggingGuard};
