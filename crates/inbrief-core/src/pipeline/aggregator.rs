//! Aggregator event loop.
//!
//! The aggregator is the only owner of the event buffer. Each loop iteration
//! reacts to exactly one stimulus -- cancellation, a timer tick, or an inbound
//! event -- so appending to the buffer and snapshotting it never overlap and
//! no lock is needed.
//!
//! Shutdown (cancellation or inbound close) runs in a fixed order:
//! 1. flush whatever is buffered, exactly once
//! 2. close the handoff channel
//! 3. stop the timer
//! 4. wait for the flush worker to drain

use std::time::Duration;

use inbrief_types::event::Event;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::HANDOFF_CAPACITY;
use super::flush::{FlushStats, FlushWorker};
use crate::notify::Notifier;
use crate::storage::BlobStore;

/// Default interval between periodic flushes.
pub const DEFAULT_FLUSH_PERIOD: Duration = Duration::from_secs(5);

/// Buffers events and hands snapshots to a [`FlushWorker`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    capacity: usize,
    period: Duration,
}

impl Aggregator {
    /// An aggregator flushing every `capacity` events and every `period`.
    ///
    /// A capacity of 0 is treated as 1 and a zero period as the default.
    pub fn new(capacity: usize, period: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            period: if period.is_zero() {
                DEFAULT_FLUSH_PERIOD
            } else {
                period
            },
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run the event loop until `cancel` fires or `inbound` closes.
    ///
    /// Spawns `worker` as the sole consumer of the handoff channel and only
    /// returns after it has handled the final snapshot. Events still queued in
    /// `inbound` when cancellation fires are not read.
    pub async fn run<S, N>(
        &self,
        worker: FlushWorker<S, N>,
        cancel: CancellationToken,
        mut inbound: mpsc::Receiver<Event>,
    ) -> FlushStats
    where
        S: BlobStore + 'static,
        N: Notifier + 'static,
    {
        let (handoff, snapshots) = mpsc::channel(HANDOFF_CAPACITY);
        let worker = tokio::spawn(worker.run(snapshots));

        let mut buffer = Buffer::new(self.capacity, handoff);
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(capacity = self.capacity, period = ?self.period, "aggregator started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("aggregator cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    debug!(pending = buffer.len(), "periodic flush");
                    buffer.send_safe().await;
                }
                event = inbound.recv() => match event {
                    Some(event) => buffer.push(event).await,
                    None => {
                        debug!("inbound channel closed");
                        break;
                    }
                },
            }
        }

        buffer.send_safe().await;
        drop(buffer);
        drop(ticker);

        match worker.await {
            Ok(stats) => {
                debug!(?stats, "aggregator stopped");
                stats
            }
            Err(err) => {
                error!(error = %err, "flush worker task failed");
                FlushStats::default()
            }
        }
    }
}

/// The event buffer plus the sending half of the handoff channel.
///
/// Dropping it closes the handoff channel.
struct Buffer {
    events: Vec<Event>,
    capacity: usize,
    handoff: mpsc::Sender<Vec<Event>>,
}

impl Buffer {
    fn new(capacity: usize, handoff: mpsc::Sender<Vec<Event>>) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            handoff,
        }
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    /// Append `event`, flushing synchronously once the buffer is full.
    async fn push(&mut self, event: Event) {
        self.events.push(event);
        if self.events.len() >= self.capacity {
            self.send_safe().await;
        }
    }

    /// Hand the buffered events to the worker and start a fresh buffer.
    ///
    /// The snapshot is moved out, so later appends cannot touch it. Blocks
    /// while the handoff channel is full.
    async fn send_safe(&mut self) {
        let snapshot = std::mem::replace(&mut self.events, Vec::with_capacity(self.capacity));
        if let Err(err) = self.handoff.send(snapshot).await {
            warn!(lost = err.0.len(), "flush worker is gone, dropping snapshot");
        }
    }
}
