//! HTTP request handlers.

pub mod batches;
pub mod fetch;
