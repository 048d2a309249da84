//! Ports onto the chat source.
//!
//! The real-time update stream itself is just an `mpsc::Receiver<Update>`;
//! these traits cover the request/response side: resolving chats to public
//! names and paging through message history.

use inbrief_types::chat::ChatId;
use inbrief_types::error::{HistoryError, ResolveError};
use inbrief_types::update::ChatMessage;

/// Resolves a chat to the public name used in message links.
pub trait ChatResolver: Send + Sync {
    /// Public username of `chat_id`, or its numeric id when it has none.
    ///
    /// Fails with [`ResolveError::UnsupportedChatKind`] for chats that have
    /// no public identity.
    fn resolve(
        &self,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<String, ResolveError>> + Send;
}

/// Read access to stored chat history.
pub trait HistoryClient: Send + Sync {
    /// Up to `limit` messages of `chat_id`, newest first, strictly older than
    /// `from_message_id`. A `from_message_id` of 0 starts at the newest
    /// message. An empty page means the history is exhausted.
    fn chat_history(
        &self,
        chat_id: ChatId,
        from_message_id: i64,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, HistoryError>> + Send;

    /// Chat ids added by a chat-folder invite link.
    fn folder_chats(
        &self,
        invite_link: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatId>, HistoryError>> + Send;
}
