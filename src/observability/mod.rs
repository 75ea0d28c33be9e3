//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing` fields, not formatted strings
//! - Log level configurable via CLI and `RUST_LOG`

pub mod logging;

pub use logging::init_logging;
