//! Application state shared by the HTTP handlers.
//!
//! Pins the generic history fetcher to the snapshot directory and carries the
//! handles the handlers need to reach the running pipeline.

use std::sync::Arc;

use inbrief_core::ingest::HistoryFetcher;
use inbrief_core::notify::BroadcastNotifier;
use inbrief_infra::source::SnapshotDirectory;
use inbrief_types::event::Event;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type ConcreteHistoryFetcher = HistoryFetcher<SnapshotDirectory, SnapshotDirectory>;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<ConcreteHistoryFetcher>,
    /// On-demand input of the fan-in.
    pub fetch_sink: mpsc::Sender<Event>,
    /// In-process side of the notification topic.
    pub notifier: BroadcastNotifier,
    pub topic: String,
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(
        directory: Arc<SnapshotDirectory>,
        fetch_sink: mpsc::Sender<Event>,
        notifier: BroadcastNotifier,
        topic: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher: Arc::new(HistoryFetcher::new(Arc::clone(&directory), directory)),
            fetch_sink,
            notifier,
            topic: topic.into(),
            cancel,
        }
    }
}
