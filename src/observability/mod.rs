//! # Observability
//!
//! Structured logging for the translator. Events are emitted with `tracing`
//! throughout the crate; this module installs the subscriber that renders
//! them.

pub mod logging;

pub use logging::{init_logging, log_config_info};
