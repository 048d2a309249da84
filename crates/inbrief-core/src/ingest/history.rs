//! On-demand history fetch.
//!
//! Pages backward through a chat's history, newest first, until a message
//! older than the left bound shows up. Unlike the live stream, fetch errors
//! are returned to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use inbrief_types::chat::ChatId;
use inbrief_types::error::HistoryError;
use inbrief_types::event::Event;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::sanitize::sanitize;
use crate::source::{ChatResolver, HistoryClient};

/// Messages requested per history page.
pub const HISTORY_PAGE_LIMIT: u32 = 100;

pub struct HistoryFetcher<H, R> {
    client: Arc<H>,
    resolver: Arc<R>,
}

impl<H: HistoryClient, R: ChatResolver> HistoryFetcher<H, R> {
    pub fn new(client: Arc<H>, resolver: Arc<R>) -> Self {
        Self { client, resolver }
    }

    /// Text messages of `chat_id` sent at or after `left`, newest first.
    ///
    /// Messages sent after `right`, when given, are skipped. Messages that are
    /// empty after sanitization are dropped; no length filter applies here.
    pub async fn fetch_chat(
        &self,
        chat_id: ChatId,
        left: DateTime<Utc>,
        right: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, HistoryError> {
        if right.is_some_and(|right| right < left) {
            return Err(HistoryError::InvalidRange);
        }

        let public_name = self.resolver.resolve(chat_id).await?;
        let left_secs = left.timestamp();
        let right_secs = right.map(|r| r.timestamp());

        let mut events = Vec::new();
        let mut from_message_id = 0;

        loop {
            let page = self
                .client
                .chat_history(chat_id, from_message_id, HISTORY_PAGE_LIMIT)
                .await?;
            let Some(last) = page.last() else {
                debug!(%chat_id, "history exhausted");
                break;
            };
            let next_from = last.id;

            let mut reached_left = false;
            for message in &page {
                if message.date < left_secs {
                    debug!(%chat_id, message_id = message.id, "reached left bound");
                    reached_left = true;
                    break;
                }
                if right_secs.is_some_and(|right| message.date > right) {
                    continue;
                }
                let (Some(text), Some(timestamp)) = (message.text(), message.sent_at()) else {
                    continue;
                };
                let processed = sanitize(text);
                if processed.is_empty() {
                    continue;
                }
                events.push(Event::new(
                    message.id,
                    chat_id,
                    processed,
                    timestamp,
                    &public_name,
                ));
            }

            if reached_left || next_from == from_message_id {
                break;
            }
            from_message_id = next_from;
        }

        info!(%chat_id, count = events.len(), "fetched chat history");
        Ok(events)
    }

    /// [`fetch_chat`](Self::fetch_chat) for each chat in turn, concatenated.
    pub async fn fetch_chats(
        &self,
        chat_ids: &[ChatId],
        left: DateTime<Utc>,
        right: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, HistoryError> {
        let mut events = Vec::new();
        for &chat_id in chat_ids {
            events.extend(self.fetch_chat(chat_id, left, right).await?);
        }
        Ok(events)
    }

    /// Fetch every chat added by a chat-folder invite link.
    pub async fn fetch_folder(
        &self,
        invite_link: &str,
        left: DateTime<Utc>,
        right: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>, HistoryError> {
        let chat_ids = self.client.folder_chats(invite_link).await?;
        debug!(invite_link, chats = chat_ids.len(), "expanded chat folder");
        self.fetch_chats(&chat_ids, left, right).await
    }
}

/// Feed fetched `events` into the aggregation surface in the background.
///
/// The task resolves to the number of events delivered; it stops early when
/// `cancel` fires or `sink` is closed.
pub fn forward(
    events: Vec<Event>,
    sink: mpsc::Sender<Event>,
    cancel: CancellationToken,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let total = events.len();
        let mut sent = 0;
        for event in events {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = sink.send(event) => {
                    if result.is_err() {
                        break;
                    }
                    sent += 1;
                }
            }
        }
        debug!(sent, total, "forwarded fetched events");
        sent
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use inbrief_types::chat::ChatKind;
    use inbrief_types::error::ResolveError;
    use inbrief_types::text::{EntityKind, FormattedText};
    use inbrief_types::update::{ChatMessage, MessageContent};

    const CHANNEL: ChatId = ChatId(-100);
    const GROUP: ChatId = ChatId(-200);

    /// History client over an in-memory message list, oldest first.
    #[derive(Default)]
    struct MockHistory {
        messages: HashMap<ChatId, Vec<ChatMessage>>,
        folders: HashMap<String, Vec<ChatId>>,
        requests: Mutex<Vec<(ChatId, i64)>>,
        fail: bool,
    }

    impl MockHistory {
        /// `count` text messages one minute apart, ids 1..=count.
        fn with_chat(mut self, chat_id: ChatId, count: i64) -> Self {
            let messages = (1..=count)
                .map(|id| ChatMessage {
                    id,
                    chat_id,
                    date: 1_700_000_000 + id * 60,
                    content: MessageContent::Text {
                        text: FormattedText::plain(format!("message {id}")),
                    },
                })
                .collect();
            self.messages.insert(chat_id, messages);
            self
        }

        fn push(mut self, message: ChatMessage) -> Self {
            self.messages.entry(message.chat_id).or_default().push(message);
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl HistoryClient for MockHistory {
        async fn chat_history(
            &self,
            chat_id: ChatId,
            from_message_id: i64,
            limit: u32,
        ) -> Result<Vec<ChatMessage>, HistoryError> {
            self.requests.lock().unwrap().push((chat_id, from_message_id));
            if self.fail {
                return Err(HistoryError::Paging {
                    chat_id,
                    message: "flood wait".to_string(),
                });
            }
            let all = self.messages.get(&chat_id).cloned().unwrap_or_default();
            Ok(all
                .into_iter()
                .rev()
                .filter(|m| from_message_id == 0 || m.id < from_message_id)
                .take(limit as usize)
                .collect())
        }

        async fn folder_chats(&self, invite_link: &str) -> Result<Vec<ChatId>, HistoryError> {
            self.folders
                .get(invite_link)
                .cloned()
                .ok_or_else(|| HistoryError::FolderNotFound(invite_link.to_string()))
        }
    }

    struct MockResolver;

    impl ChatResolver for MockResolver {
        async fn resolve(&self, chat_id: ChatId) -> Result<String, ResolveError> {
            match chat_id {
                CHANNEL => Ok("news".to_string()),
                GROUP => Ok("200".to_string()),
                _ => Err(ResolveError::UnsupportedChatKind(ChatKind::Private)),
            }
        }
    }

    fn fetcher(history: MockHistory) -> HistoryFetcher<MockHistory, MockResolver> {
        HistoryFetcher::new(Arc::new(history), Arc::new(MockResolver))
    }

    fn at(id: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + id * 60, 0).unwrap()
    }

    #[tokio::test]
    async fn stops_at_left_bound_across_pages() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 250));

        let events = fetcher.fetch_chat(CHANNEL, at(120), None).await.unwrap();

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, (120..=250).rev().collect::<Vec<_>>());
        assert_eq!(events[0].link, "https://t.me/news/250");
        // Pages start at 0, then continue from the oldest id of each page.
        let requests = fetcher.client.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![(CHANNEL, 0), (CHANNEL, 151)]);
    }

    #[tokio::test]
    async fn empty_page_ends_paging() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 150));

        let events = fetcher
            .fetch_chat(CHANNEL, DateTime::UNIX_EPOCH, None)
            .await
            .unwrap();

        assert_eq!(events.len(), 150);
        // Two full pages, then an empty one.
        assert_eq!(fetcher.client.request_count(), 3);
    }

    #[tokio::test]
    async fn right_bound_skips_newer_messages() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 30));

        let events = fetcher
            .fetch_chat(CHANNEL, at(10), Some(at(20)))
            .await
            .unwrap();

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, (10..=20).rev().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 3));

        let result = fetcher.fetch_chat(CHANNEL, at(3), Some(at(1))).await;

        assert!(matches!(result, Err(HistoryError::InvalidRange)));
        assert_eq!(fetcher.client.request_count(), 0);
    }

    #[tokio::test]
    async fn text_is_sanitized_and_other_content_skipped() {
        let history = MockHistory::default()
            .push(ChatMessage {
                id: 1,
                chat_id: CHANNEL,
                date: at(1).timestamp(),
                content: MessageContent::Text {
                    text: FormattedText::plain("Hello #world").with_entity(EntityKind::Hashtag, 6, 6),
                },
            })
            .push(ChatMessage {
                id: 2,
                chat_id: CHANNEL,
                date: at(2).timestamp(),
                content: MessageContent::Sticker,
            })
            .push(ChatMessage {
                id: 3,
                chat_id: CHANNEL,
                date: at(3).timestamp(),
                content: MessageContent::Text {
                    text: FormattedText::plain("#only").with_entity(EntityKind::Hashtag, 0, 5),
                },
            });
        let fetcher = fetcher(history);

        let events = fetcher.fetch_chat(CHANNEL, at(0), None).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Hello ");
        assert_eq!(events[0].timestamp, at(1));
    }

    #[tokio::test]
    async fn resolution_failure_is_returned() {
        let fetcher = fetcher(MockHistory::default().with_chat(ChatId(5), 3));

        let result = fetcher.fetch_chat(ChatId(5), at(0), None).await;

        assert!(matches!(
            result,
            Err(HistoryError::Resolve(ResolveError::UnsupportedChatKind(
                ChatKind::Private
            )))
        ));
    }

    #[tokio::test]
    async fn paging_failure_is_returned() {
        let history = MockHistory {
            fail: true,
            ..MockHistory::default().with_chat(CHANNEL, 3)
        };

        let result = fetcher(history).fetch_chat(CHANNEL, at(0), None).await;

        assert!(matches!(result, Err(HistoryError::Paging { .. })));
    }

    #[tokio::test]
    async fn folder_expands_to_its_chats() {
        let mut history = MockHistory::default()
            .with_chat(CHANNEL, 2)
            .with_chat(GROUP, 3);
        history
            .folders
            .insert("https://t.me/addlist/abc".to_string(), vec![CHANNEL, GROUP]);
        let fetcher = fetcher(history);

        let events = fetcher
            .fetch_folder("https://t.me/addlist/abc", at(0), None)
            .await
            .unwrap();

        let chats: Vec<ChatId> = events.iter().map(|e| e.chat_id).collect();
        assert_eq!(chats, vec![CHANNEL, CHANNEL, GROUP, GROUP, GROUP]);
        assert_eq!(events[2].link, "https://t.me/200/3");

        let missing = fetcher.fetch_folder("https://t.me/addlist/nope", at(0), None).await;
        assert!(matches!(missing, Err(HistoryError::FolderNotFound(_))));
    }

    #[tokio::test]
    async fn forward_delivers_in_order() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 5));
        let events = fetcher.fetch_chat(CHANNEL, at(0), None).await.unwrap();
        let (tx, mut rx) = mpsc::channel(1);

        let handle = forward(events, tx, CancellationToken::new());
        let mut ids = Vec::new();
        while let Some(event) = rx.recv().await {
            ids.push(event.id);
        }

        assert_eq!(handle.await.unwrap(), 5);
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn forward_stops_on_cancel() {
        let fetcher = fetcher(MockHistory::default().with_chat(CHANNEL, 5));
        let events = fetcher.fetch_chat(CHANNEL, at(0), None).await.unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let handle = forward(events, tx, cancel.clone());
        cancel.cancel();

        // At most the single buffered slot was filled before cancellation.
        assert!(handle.await.unwrap() <= 1);
    }
}
