//! `inbrief serve` -- wire and run the whole pipeline.
//!
//! ```text
//! update source -> listener --live--\
//!                                    fan-in -> aggregator -> flush worker -> blob store
//! POST /api/v1/fetch ------fetch----/                                    \-> topic (+ webhook)
//! ```
//!
//! Everything shares one cancellation token. Ctrl+C / SIGTERM cancels it;
//! the HTTP server stops accepting requests, the listener and fan-in stop,
//! and the aggregator flushes what it buffered before the worker drains.

use std::path::Path;
use std::sync::Arc;

use inbrief_core::channel::merge;
use inbrief_core::ingest::{ListenerStats, UpdateListener};
use inbrief_core::notify::BroadcastNotifier;
use inbrief_core::pipeline::{Aggregator, FlushStats, FlushWorker};
use inbrief_infra::config::default_blob_root;
use inbrief_infra::notify::TopicNotifier;
use inbrief_infra::source::{SnapshotDirectory, UpdateInput, spawn_update_reader};
use inbrief_infra::storage::LocalBlobStore;
use inbrief_types::config::AppConfig;
use inbrief_types::event::Event;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::http::router::build_router;
use crate::state::AppState;

/// Subscribers of the in-process topic may lag this many ids behind.
const TOPIC_CAPACITY: usize = 64;

pub async fn serve(config: AppConfig, data_dir: &Path) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let streaming = &config.streaming;

    let addr = config.server.addr();
    let tcp = tokio::net::TcpListener::bind(&addr).await?;

    let directory = Arc::new(match &config.source.directory {
        Some(path) => SnapshotDirectory::load(path).await?,
        None => {
            tracing::warn!("no chat directory configured, every chat will be unresolvable");
            SnapshotDirectory::default()
        }
    });

    let blob_root = config
        .storage
        .root
        .clone()
        .unwrap_or_else(|| default_blob_root(data_dir));
    let store = Arc::new(LocalBlobStore::new(&blob_root, &config.storage.bucket));
    tracing::info!(path = %store.dir().display(), "blob store ready");

    let broadcast = BroadcastNotifier::new(TOPIC_CAPACITY);
    let notifier = Arc::new(TopicNotifier::from_config(
        broadcast.clone(),
        config.notify.webhook_url.as_deref(),
    )?);

    let (live_tx, live_rx) = mpsc::channel(streaming.channel_capacity);
    let (fetch_tx, fetch_rx) = mpsc::channel(streaming.channel_capacity);

    let listener = spawn_listener(&config, Arc::clone(&directory), live_tx, cancel.clone());

    let merged = merge(cancel.clone(), vec![live_rx, fetch_rx], streaming.channel_capacity);
    let worker = FlushWorker::new(store, notifier, config.notify.topic.clone())
        .with_timeout(streaming.flush_timeout());
    let aggregator = Aggregator::new(streaming.batch_size, streaming.flush_period());
    let pipeline = tokio::spawn({
        let cancel = cancel.clone();
        async move { aggregator.run(worker, cancel, merged).await }
    });

    let state = AppState::new(
        directory,
        fetch_tx,
        broadcast,
        config.notify.topic.clone(),
        cancel.clone(),
    );
    tracing::info!(%addr, "inbrief API listening");

    let server = axum::serve(tcp, build_router(state))
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await;
    // The server may also stop on its own error; make sure the rest follows.
    cancel.cancel();

    drain(server, listener, pipeline).await
}

/// Wait for the listener and the pipeline to finish, then report the
/// server's outcome. The pipeline's final flush runs even when the server
/// failed.
async fn drain(
    server: std::io::Result<()>,
    listener: Option<JoinHandle<ListenerStats>>,
    pipeline: JoinHandle<FlushStats>,
) -> anyhow::Result<()> {
    if let Some(listener) = listener {
        match listener.await {
            Ok(stats) => tracing::info!(?stats, "update listener stopped"),
            Err(err) => tracing::error!(error = %err, "update listener task failed"),
        }
    }

    let stats = pipeline.await?;
    tracing::info!(
        flushed = stats.flushed,
        events = stats.events,
        failed = stats.failed,
        "pipeline stopped"
    );

    server?;
    Ok(())
}

/// Start the update reader and listener when streaming is enabled and a
/// source is configured. Otherwise `live` is dropped, closing that input.
fn spawn_listener(
    config: &AppConfig,
    directory: Arc<SnapshotDirectory>,
    live: mpsc::Sender<Event>,
    cancel: CancellationToken,
) -> Option<JoinHandle<ListenerStats>> {
    if !config.streaming.enabled {
        tracing::info!("streaming disabled, only on-demand fetches are aggregated");
        return None;
    }
    let Some(path) = &config.source.updates else {
        tracing::info!("no update source configured, live stream is idle");
        return None;
    };

    let (updates, reader) = spawn_update_reader(
        UpdateInput::from_path(path),
        config.streaming.channel_capacity,
        cancel.clone(),
    );
    tokio::spawn(async move {
        match reader.await {
            Ok(Ok(stats)) => tracing::info!(?stats, "update source exhausted"),
            Ok(Err(err)) => tracing::error!(error = %err, "update source failed"),
            Err(err) => tracing::error!(error = %err, "update reader task failed"),
        }
    });

    let listener = UpdateListener::new(directory).with_min_text_chars(config.streaming.min_text_chars);
    Some(tokio::spawn(async move { listener.run(cancel, updates, live).await }))
}

/// Wait for Ctrl+C, SIGTERM, or an internal cancellation, then cancel.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        _ = cancel.cancelled() => {}
    }

    cancel.cancel();
}
