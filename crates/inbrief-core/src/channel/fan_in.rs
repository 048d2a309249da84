//! Fan-in merge of several `mpsc` receivers into one.
//!
//! One forwarding task is spawned per input. Every forwarder owns a clone of
//! the output sender, so the output channel closes exactly when the last
//! forwarder exits: never while an input could still produce.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Merge `inputs` into a single receiver with room for `capacity` items.
///
/// Items from one input keep their relative order; items from different
/// inputs interleave in arrival order. A forwarder stops when its input
/// closes, when the output receiver is dropped, or when `cancel` fires, in
/// which case an item it was holding is dropped.
pub fn merge<T>(
    cancel: CancellationToken,
    inputs: Vec<mpsc::Receiver<T>>,
    capacity: usize,
) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    for (source, mut input) in inputs.into_iter().enumerate() {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let item = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    item = input.recv() => match item {
                        Some(item) => item,
                        None => break,
                    },
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = tx.send(item) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!(source, "fan-in forwarder stopped");
        });
    }

    rx
}
