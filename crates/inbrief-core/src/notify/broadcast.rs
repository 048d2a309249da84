//! In-process notification topic.
//!
//! Built on `tokio::sync::broadcast`, so any number of subscribers (the SSE
//! endpoint, tests) see every announcement. Publishing with no subscribers
//! is not an error: nobody is listening, which is a normal state.

use inbrief_types::error::PublishError;
use tokio::sync::broadcast;
use tracing::debug;

use super::Notifier;

/// One published payload together with the topic it was published on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub topic: String,
    pub payload: String,
}

/// Multi-consumer notification topic.
///
/// Cloning the notifier clones the sender, so all clones feed the same
/// subscribers.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Announcement>,
}

impl BroadcastNotifier {
    /// Create a notifier whose subscribers may lag by up to `capacity` items.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future announcements.
    pub fn subscribe(&self) -> broadcast::Receiver<Announcement> {
        self.sender.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        let announcement = Announcement {
            topic: topic.to_string(),
            payload: payload.to_string(),
        };
        match self.sender.send(announcement) {
            Ok(count) => debug!(%topic, count, "published announcement"),
            Err(_) => debug!(%topic, "no active subscribers on topic"),
        }
        Ok(())
    }
}

impl Clone for BroadcastNotifier {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for BroadcastNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastNotifier")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_announcement() {
        let notifier = BroadcastNotifier::new(16);
        let mut rx = notifier.subscribe();

        notifier.publish("inbrief", "123").await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.topic, "inbrief");
        assert_eq!(received.payload, "123");
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_announcement() {
        let notifier = BroadcastNotifier::new(16);
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        notifier.publish("t", "1").await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().payload, "1");
        assert_eq!(rx2.recv().await.unwrap().payload, "1");
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_succeeds() {
        let notifier = BroadcastNotifier::new(16);
        assert!(notifier.publish("t", "1").await.is_ok());
    }

    #[tokio::test]
    async fn clone_shares_channel() {
        let notifier = BroadcastNotifier::new(16);
        let clone = notifier.clone();
        let mut rx = notifier.subscribe();

        clone.publish("t", "via-clone").await.unwrap();

        assert_eq!(rx.try_recv().unwrap().payload, "via-clone");
    }

    #[test]
    fn debug_impl() {
        let notifier = BroadcastNotifier::new(4);
        let _rx = notifier.subscribe();
        let debug = format!("{notifier:?}");
        assert!(debug.contains("BroadcastNotifier"));
        assert!(debug.contains("receiver_count"));
    }
}
