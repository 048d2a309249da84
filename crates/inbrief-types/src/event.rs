//! Sanitized message events, the unit of work of the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatId;

/// A sanitized, ready-to-persist message.
///
/// Built once by the sanitization step and never mutated afterwards. The JSON
/// form of this struct is the per-message entry of a persisted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Message id within its chat.
    pub id: i64,
    pub chat_id: ChatId,
    /// Sanitized text. Never empty.
    pub text: String,
    /// Send time, seconds resolution.
    pub timestamp: DateTime<Utc>,
    /// Public link to the original message.
    pub link: String,
}

impl Event {
    pub fn new(
        id: i64,
        chat_id: ChatId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        public_name: &str,
    ) -> Self {
        Self {
            id,
            chat_id,
            text: text.into(),
            timestamp,
            link: message_link(public_name, id),
        }
    }
}

/// Public link for message `message_id` in the chat named `public_name`.
pub fn message_link(public_name: &str, message_id: i64) -> String {
    format!("https://t.me/{public_name}/{message_id}")
}
