//! JSON chat directory snapshot.
//!
//! A snapshot holds the chats the source knows about, the chat-folder invite
//! links and the stored message history. It backs both the live listener
//! (chat resolution) and the on-demand history fetch.
//!
//! ```json
//! {
//!   "chats": [{"id": -100, "title": "News", "kind": "supergroup", "usernames": ["news"]}],
//!   "folders": {"https://t.me/addlist/abc": [-100]},
//!   "messages": [{"id": 1, "chat_id": -100, "date": 1700000000,
//!                 "content": {"type": "text", "text": {"text": "hello"}}}]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use inbrief_core::source::{ChatResolver, HistoryClient};
use inbrief_types::chat::{Chat, ChatId};
use inbrief_types::error::{HistoryError, ResolveError, SnapshotError};
use inbrief_types::update::ChatMessage;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    chats: Vec<Chat>,
    #[serde(default)]
    folders: HashMap<String, Vec<ChatId>>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// In-memory chat directory.
#[derive(Debug, Default)]
pub struct SnapshotDirectory {
    chats: HashMap<ChatId, Chat>,
    folders: HashMap<String, Vec<ChatId>>,
    /// Per chat, sorted by message id ascending.
    history: HashMap<ChatId, Vec<ChatMessage>>,
}

impl SnapshotDirectory {
    /// Load a snapshot file.
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let directory = Self::from_json(&content).map_err(|source| SnapshotError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            chats = directory.chats.len(),
            folders = directory.folders.len(),
            "loaded chat directory"
        );
        Ok(directory)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: SnapshotFile = serde_json::from_str(json)?;

        let chats = file.chats.into_iter().map(|chat| (chat.id, chat)).collect();

        let mut history: HashMap<ChatId, Vec<ChatMessage>> = HashMap::new();
        for message in file.messages {
            history.entry(message.chat_id).or_default().push(message);
        }
        for messages in history.values_mut() {
            messages.sort_by_key(|m| m.id);
            messages.dedup_by_key(|m| m.id);
        }

        Ok(Self {
            chats,
            folders: file.folders,
            history,
        })
    }

    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.get(&chat_id)
    }
}

impl ChatResolver for SnapshotDirectory {
    async fn resolve(&self, chat_id: ChatId) -> Result<String, ResolveError> {
        self.chat(chat_id)
            .ok_or(ResolveError::ChatNotFound(chat_id))?
            .public_name()
    }
}

impl HistoryClient for SnapshotDirectory {
    async fn chat_history(
        &self,
        chat_id: ChatId,
        from_message_id: i64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, HistoryError> {
        if self.chat(chat_id).is_none() {
            return Err(ResolveError::ChatNotFound(chat_id).into());
        }
        let Some(messages) = self.history.get(&chat_id) else {
            return Ok(Vec::new());
        };

        let end = if from_message_id == 0 {
            messages.len()
        } else {
            messages.partition_point(|m| m.id < from_message_id)
        };

        Ok(messages[..end]
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn folder_chats(&self, invite_link: &str) -> Result<Vec<ChatId>, HistoryError> {
        self.folders
            .get(invite_link)
            .cloned()
            .ok_or_else(|| HistoryError::FolderNotFound(invite_link.to_string()))
    }
}
