//! Recording collaborators shared by the pipeline tests.

use std::sync::Mutex;
use std::time::Duration;

use chrono::DateTime;
use inbrief_types::chat::ChatId;
use inbrief_types::error::{BlobStoreError, PublishError};
use inbrief_types::event::Event;

use crate::notify::Notifier;
use crate::storage::BlobStore;

/// Blob store that keeps every put in memory.
#[derive(Default)]
pub struct MemoryBlobStore {
    pub blobs: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl MemoryBlobStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Event texts of every stored batch, in put order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.blobs
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| {
                let events: Vec<Event> = serde_json::from_slice(body).unwrap();
                events.into_iter().map(|e| e.text).collect()
            })
            .collect()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), BlobStoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(BlobStoreError::Io("store unavailable".to_string()));
        }
        self.blobs.lock().unwrap().push((key.to_string(), body));
        Ok(())
    }
}

/// Notifier that records every publish.
#[derive(Default)]
pub struct RecordingNotifier {
    pub published: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn payloads(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        if self.fail {
            return Err(PublishError::Transport("connection refused".to_string()));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

pub fn event(text: &str) -> Event {
    let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    Event::new(1, ChatId(-100), text, ts, "chan")
}
