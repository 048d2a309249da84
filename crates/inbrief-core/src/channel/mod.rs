//! Channel plumbing shared by the ingest paths.
//!
//! - `fan_in` -- merge several event channels into one, with cancellation

pub mod fan_in;

pub use fan_in::merge;
