//! Real-time update listener.
//!
//! Consumes the update stream, keeps new text messages that survive
//! sanitization and the length filter, and forwards them as events. Every
//! other update or content kind is ignored.

use std::sync::Arc;

use inbrief_types::event::Event;
use inbrief_types::update::{ChatMessage, Update};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::sanitize::sanitize;
use crate::source::ChatResolver;

/// Minimum sanitized length (exclusive) for a streamed message to be kept.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Counters of a listener's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub received: usize,
    pub forwarded: usize,
    /// Updates that are not new text messages.
    pub ignored: usize,
    /// Messages whose chat could not be resolved.
    pub unresolved: usize,
    /// Messages too short after sanitization.
    pub too_short: usize,
}

/// Outcome of handling a single update.
#[derive(Debug, PartialEq)]
enum Handled {
    Event(Event),
    Ignored,
    Unresolved,
    TooShort,
}

pub struct UpdateListener<R> {
    resolver: Arc<R>,
    min_text_chars: usize,
}

impl<R: ChatResolver> UpdateListener<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }

    /// Keep only texts with strictly more than `chars` scalar values.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// Forward events built from `updates` into `events`.
    ///
    /// Runs until `cancel` fires, `updates` closes, or `events` is dropped.
    pub async fn run(
        &self,
        cancel: CancellationToken,
        mut updates: mpsc::Receiver<Update>,
        events: mpsc::Sender<Event>,
    ) -> ListenerStats {
        let mut stats = ListenerStats::default();

        loop {
            let update = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                update = updates.recv() => match update {
                    Some(update) => update,
                    None => {
                        debug!("update stream closed");
                        break;
                    }
                },
            };
            stats.received += 1;

            let event = match self.handle(update).await {
                Handled::Event(event) => event,
                Handled::Ignored => {
                    stats.ignored += 1;
                    continue;
                }
                Handled::Unresolved => {
                    stats.unresolved += 1;
                    continue;
                }
                Handled::TooShort => {
                    stats.too_short += 1;
                    continue;
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = events.send(event) => {
                    if sent.is_err() {
                        debug!("event channel closed, stopping listener");
                        break;
                    }
                    stats.forwarded += 1;
                }
            }
        }

        debug!(?stats, "update listener stopped");
        stats
    }

    async fn handle(&self, update: Update) -> Handled {
        match update {
            Update::NewMessage { message } => self.handle_message(&message).await,
            _ => Handled::Ignored,
        }
    }

    async fn handle_message(&self, message: &ChatMessage) -> Handled {
        debug!(chat_id = %message.chat_id, message_id = message.id, "new message");

        let Some(text) = message.text() else {
            return Handled::Ignored;
        };
        let Some(timestamp) = message.sent_at() else {
            debug!(message_id = message.id, date = message.date, "message date out of range");
            return Handled::Ignored;
        };

        let public_name = match self.resolver.resolve(message.chat_id).await {
            Ok(name) => name,
            Err(err) => {
                debug!(chat_id = %message.chat_id, error = %err, "unable to resolve chat");
                return Handled::Unresolved;
            }
        };

        let processed = sanitize(text);
        trace!(text = %processed, "processed text");
        if processed.chars().count() <= self.min_text_chars {
            return Handled::TooShort;
        }

        Handled::Event(Event::new(
            message.id,
            message.chat_id,
            processed,
            timestamp,
            &public_name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use inbrief_types::chat::{ChatId, ChatKind};
    use inbrief_types::error::ResolveError;
    use inbrief_types::text::{EntityKind, FormattedText};
    use inbrief_types::update::MessageContent;

    struct MockResolver {
        names: HashMap<ChatId, Result<String, ChatKind>>,
    }

    impl MockResolver {
        fn new() -> Self {
            let mut names = HashMap::new();
            names.insert(ChatId(-100), Ok("news".to_string()));
            names.insert(ChatId(7), Err(ChatKind::Private));
            Self { names }
        }
    }

    impl ChatResolver for MockResolver {
        async fn resolve(&self, chat_id: ChatId) -> Result<String, ResolveError> {
            match self.names.get(&chat_id) {
                Some(Ok(name)) => Ok(name.clone()),
                Some(Err(kind)) => Err(ResolveError::UnsupportedChatKind(*kind)),
                None => Err(ResolveError::ChatNotFound(chat_id)),
            }
        }
    }

    fn long_text() -> String {
        "x".repeat(60)
    }

    fn text_message(chat_id: i64, id: i64, text: FormattedText) -> Update {
        Update::NewMessage {
            message: ChatMessage {
                id,
                chat_id: ChatId(chat_id),
                date: 1_700_000_000,
                content: MessageContent::Text { text },
            },
        }
    }

    fn listener() -> UpdateListener<MockResolver> {
        UpdateListener::new(Arc::new(MockResolver::new()))
    }

    #[tokio::test]
    async fn new_text_message_becomes_event() {
        let update = text_message(-100, 42, FormattedText::plain(long_text()));

        let Handled::Event(event) = listener().handle(update).await else {
            panic!("expected an event");
        };
        assert_eq!(event.id, 42);
        assert_eq!(event.text, long_text());
        assert_eq!(event.link, "https://t.me/news/42");
        assert_eq!(event.timestamp.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn formatting_spans_are_stripped_before_length_check() {
        // 45 kept characters plus a 20-unit hashtag: too short once stripped.
        let body = format!("{}{}", "y".repeat(45), "#".repeat(20));
        let text = FormattedText::plain(body).with_entity(EntityKind::Hashtag, 45, 20);

        assert_eq!(
            listener().handle(text_message(-100, 1, text)).await,
            Handled::TooShort
        );
    }

    #[tokio::test]
    async fn length_threshold_is_strict() {
        let exactly = FormattedText::plain("z".repeat(50));
        let above = FormattedText::plain("z".repeat(51));

        assert_eq!(
            listener().handle(text_message(-100, 1, exactly)).await,
            Handled::TooShort
        );
        assert!(matches!(
            listener().handle(text_message(-100, 2, above)).await,
            Handled::Event(_)
        ));
    }

    #[tokio::test]
    async fn threshold_counts_scalar_values_not_utf16_units() {
        // 30 emoji are 60 UTF-16 units but only 30 chars.
        let text = FormattedText::plain("😀".repeat(30));
        assert_eq!(
            listener().handle(text_message(-100, 1, text)).await,
            Handled::TooShort
        );

        let lowered = UpdateListener::new(Arc::new(MockResolver::new())).with_min_text_chars(10);
        let text = FormattedText::plain("😀".repeat(30));
        assert!(matches!(
            lowered.handle(text_message(-100, 1, text)).await,
            Handled::Event(_)
        ));
    }

    #[tokio::test]
    async fn unresolvable_chat_is_dropped() {
        let private = text_message(7, 1, FormattedText::plain(long_text()));
        let unknown = text_message(99, 1, FormattedText::plain(long_text()));

        assert_eq!(listener().handle(private).await, Handled::Unresolved);
        assert_eq!(listener().handle(unknown).await, Handled::Unresolved);
    }

    #[tokio::test]
    async fn non_text_content_and_other_updates_are_ignored() {
        let photo = Update::NewMessage {
            message: ChatMessage {
                id: 1,
                chat_id: ChatId(-100),
                date: 1_700_000_000,
                content: MessageContent::Photo {
                    caption: FormattedText::plain(long_text()),
                },
            },
        };
        let edited = Update::MessageEdited {
            chat_id: ChatId(-100),
            message_id: 1,
        };

        assert_eq!(listener().handle(photo).await, Handled::Ignored);
        assert_eq!(listener().handle(edited).await, Handled::Ignored);
        assert_eq!(listener().handle(Update::Other).await, Handled::Ignored);
    }

    #[tokio::test]
    async fn run_forwards_until_updates_close() {
        let (update_tx, update_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);

        update_tx
            .send(text_message(-100, 1, FormattedText::plain(long_text())))
            .await
            .unwrap();
        update_tx.send(Update::Other).await.unwrap();
        update_tx
            .send(text_message(7, 2, FormattedText::plain(long_text())))
            .await
            .unwrap();
        update_tx
            .send(text_message(-100, 3, FormattedText::plain("short")))
            .await
            .unwrap();
        update_tx
            .send(text_message(-100, 4, FormattedText::plain(long_text())))
            .await
            .unwrap();
        drop(update_tx);

        let stats = listener()
            .run(CancellationToken::new(), update_rx, event_tx)
            .await;

        assert_eq!(
            stats,
            ListenerStats {
                received: 5,
                forwarded: 2,
                ignored: 1,
                unresolved: 1,
                too_short: 1,
            }
        );
        let ids: Vec<i64> = std::iter::from_fn(|| event_rx.try_recv().ok())
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let (_update_tx, update_rx) = mpsc::channel::<Update>(1);
        let (event_tx, _event_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = listener().run(cancel, update_rx, event_tx).await;
        assert_eq!(stats, ListenerStats::default());
    }
}
