use std::time::Duration;

use thiserror::Error;

use crate::chat::{ChatId, ChatKind};

/// Errors from resolving a chat to its public name.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unsupported chat kind: {0}")]
    UnsupportedChatKind(ChatKind),

    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    #[error("chat lookup failed: {0}")]
    Lookup(String),
}

/// Errors from writing a blob.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("invalid blob key '{0}'")]
    InvalidKey(String),

    #[error("blob write failed: {0}")]
    Io(String),
}

/// Errors from publishing on a notification topic.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("notification rejected with status {0}")]
    Rejected(u16),
}

/// Why a single flush cycle failed. The batch is discarded in every case.
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("failed to serialize batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to persist batch: {0}")]
    Persist(#[from] BlobStoreError),

    #[error("failed to publish batch id: {0}")]
    Publish(#[from] PublishError),

    #[error("flush timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the on-demand history fetch.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("chat folder link '{0}' is not known")]
    FolderNotFound(String),

    #[error("failed to page history of chat {chat_id}: {message}")]
    Paging { chat_id: ChatId, message: String },

    #[error("left bound is after right bound")]
    InvalidRange,
}

/// Errors from loading a chat directory snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
