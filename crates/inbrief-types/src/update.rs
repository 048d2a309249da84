//! Raw updates delivered by the real-time chat source.
//!
//! Both [`Update`] and [`MessageContent`] are closed enums with a catch-all
//! variant. The pipeline only acts on new text messages; everything else is
//! read and ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatId;
use crate::text::FormattedText;

/// One update from the chat source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// A message was posted.
    NewMessage { message: ChatMessage },
    /// An existing message was edited.
    MessageEdited { chat_id: ChatId, message_id: i64 },
    /// Messages were deleted.
    DeleteMessages {
        chat_id: ChatId,
        message_ids: Vec<i64>,
    },
    /// A chat changed its title.
    ChatTitle { chat_id: ChatId, title: String },
    /// Any update kind this crate does not model.
    #[serde(other)]
    Other,
}

/// A message as stored by the chat source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: ChatId,
    /// Unix time in seconds.
    pub date: i64,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Send time of the message, or `None` for an out-of-range date.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    /// The formatted text when this is a text message.
    pub fn text(&self) -> Option<&FormattedText> {
        match &self.content {
            MessageContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Content of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: FormattedText },
    Photo {
        #[serde(default)]
        caption: FormattedText,
    },
    Video {
        #[serde(default)]
        caption: FormattedText,
    },
    Document {
        #[serde(default)]
        caption: FormattedText,
    },
    Sticker,
    #[serde(other)]
    Unsupported,
}
