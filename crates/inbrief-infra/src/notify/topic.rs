//! The notifier wired into the flush worker.

use inbrief_core::notify::{BroadcastNotifier, Notifier};
use inbrief_types::error::PublishError;

use super::webhook::WebhookNotifier;

/// In-process broadcast topic, optionally mirrored to a webhook.
///
/// The broadcast side never fails; a webhook failure fails the publish.
#[derive(Debug, Clone)]
pub struct TopicNotifier {
    broadcast: BroadcastNotifier,
    webhook: Option<WebhookNotifier>,
}

impl TopicNotifier {
    pub fn new(broadcast: BroadcastNotifier, webhook: Option<WebhookNotifier>) -> Self {
        Self { broadcast, webhook }
    }

    /// Build from an optional webhook URL.
    pub fn from_config(broadcast: BroadcastNotifier, webhook_url: Option<&str>) -> Result<Self, PublishError> {
        let webhook = webhook_url.map(WebhookNotifier::new).transpose()?;
        Ok(Self::new(broadcast, webhook))
    }

    /// The in-process side, for subscribing.
    pub fn broadcast(&self) -> &BroadcastNotifier {
        &self.broadcast
    }
}

impl Notifier for TopicNotifier {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        self.broadcast.publish(topic, payload).await?;
        if let Some(webhook) = &self.webhook {
            webhook.publish(topic, payload).await?;
        }
        Ok(())
    }
}
