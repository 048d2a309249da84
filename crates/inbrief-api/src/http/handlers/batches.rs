//! SSE stream of published batch ids.
//!
//! GET /api/v1/batches/stream
//!
//! SSE event types:
//! - `batch` -- a batch was persisted: data is its id
//! - `lagged` -- the subscriber fell behind: data is the number of ids missed

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// GET /api/v1/batches/stream
pub async fn stream_batches(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before returning so no announcement after the request is lost.
    let mut rx = state.notifier.subscribe();
    let topic = state.topic.clone();
    let cancel = state.cancel.clone();

    let stream = async_stream::stream! {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(announcement) if announcement.topic == topic => {
                    yield Ok::<_, Infallible>(Event::default().event("batch").data(announcement.payload));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "batch stream subscriber lagged");
                    yield Ok(Event::default().event("lagged").data(missed.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
