//! Observability wiring for the inbrief binary.
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! once, here, by the process entry point.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
