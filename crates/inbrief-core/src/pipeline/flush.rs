//! Flush worker: persists batch snapshots and announces them.
//!
//! The worker is the only consumer of the handoff channel and processes one
//! snapshot at a time, so batches reach the blob store and the topic in the
//! order the aggregator produced them. Each cycle is independent: a failed
//! serialize, put, or publish is logged, the batch is discarded, and the
//! worker moves on. Delivery is at most once.

use std::sync::Arc;
use std::time::Duration;

use inbrief_types::batch::{Batch, BatchId};
use inbrief_types::error::FlushError;
use inbrief_types::event::Event;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span};

use crate::notify::Notifier;
use crate::storage::BlobStore;

/// Deadline for persisting and announcing one batch.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome counters of a worker's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Batches persisted and announced.
    pub flushed: usize,
    /// Empty snapshots skipped.
    pub skipped: usize,
    /// Batches discarded after an error.
    pub failed: usize,
    /// Events contained in flushed batches.
    pub events: usize,
}

/// Sequential consumer of batch snapshots.
pub struct FlushWorker<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    topic: String,
    timeout: Duration,
}

impl<S: BlobStore, N: Notifier> FlushWorker<S, N> {
    pub fn new(store: Arc<S>, notifier: Arc<N>, topic: impl Into<String>) -> Self {
        Self {
            store,
            notifier,
            topic: topic.into(),
            timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    /// Override the per-batch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Consume snapshots until the handoff channel closes.
    ///
    /// Returns once every snapshot sent before the close has been handled.
    pub async fn run(self, mut snapshots: mpsc::Receiver<Vec<Event>>) -> FlushStats {
        let mut stats = FlushStats::default();

        while let Some(events) = snapshots.recv().await {
            if events.is_empty() {
                info!("nothing to flush since last time");
                stats.skipped += 1;
                continue;
            }

            let count = events.len();
            info!(count, "flushing messages since last time");

            let batch = Batch::new(BatchId::now(), events);
            let span = info_span!("batch.flush", batch.id = %batch.id, batch.size = count);

            match self.flush(&batch).instrument(span).await {
                Ok(()) => {
                    info!(count, id = %batch.id, "flushed batch");
                    stats.flushed += 1;
                    stats.events += count;
                }
                Err(err) => {
                    error!(count, id = %batch.id, error = %err, "failed to flush batch, discarding it");
                    stats.failed += 1;
                }
            }
        }

        debug!(?stats, "flush worker stopped");
        stats
    }

    /// Serialize `batch`, store it under its blob key, then publish its id.
    ///
    /// Store and publish together must finish within the worker's timeout.
    pub async fn flush(&self, batch: &Batch) -> Result<(), FlushError> {
        let body = batch.to_json()?;
        let key = batch.id.blob_key();
        let payload = batch.id.to_string();

        let deliver = async {
            self.store.put(&key, body).await?;
            debug!(%key, "batch persisted");
            self.notifier.publish(&self.topic, &payload).await?;
            Ok::<(), FlushError>(())
        };

        tokio::time::timeout(self.timeout, deliver)
            .await
            .map_err(|_| FlushError::Timeout(self.timeout))?
    }
}
