//! Batch aggregation and flush pipeline.
//!
//! - `aggregator` -- single-owner event loop that buffers events and decides
//!   when to flush (capacity, timer tick, shutdown)
//! - `flush` -- sequential worker that persists each snapshot and publishes
//!   its batch id
//!
//! The two are connected by a bounded handoff channel. A slow flush blocks
//! the aggregator, which stops reading events: persistence speed throttles
//! ingestion instead of growing memory.

pub mod aggregator;
pub mod flush;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::Aggregator;
pub use flush::{FlushStats, FlushWorker};

/// Snapshots that may wait in the handoff channel while the worker is busy.
pub const HANDOFF_CAPACITY: usize = 1;
