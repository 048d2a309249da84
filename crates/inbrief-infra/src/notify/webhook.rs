//! HTTP webhook notifier.
//!
//! Each publish is a `POST` of `{"topic": ..., "payload": ...}` to the
//! configured URL. Any non-2xx status is a rejection.

use std::time::Duration;

use inbrief_core::notify::Notifier;
use inbrief_types::error::PublishError;
use serde::Serialize;

/// Request timeout for a single webhook call.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    topic: &'a str,
    payload: &'a str,
}

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| PublishError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Notifier for WebhookNotifier {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookBody { topic, payload })
            .send()
            .await
            .map_err(|e| PublishError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, %status, "webhook rejected announcement");
            return Err(PublishError::Rejected(status.as_u16()));
        }

        tracing::debug!(url = %self.url, %topic, "webhook notified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn posts_topic_and_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .json_body(json!({"topic": "inbrief", "payload": "1700000000000000000"}));
            then.status(204);
        });

        let notifier = WebhookNotifier::new(server.url("/hook")).unwrap();
        notifier.publish("inbrief", "1700000000000000000").await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn error_status_is_a_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(503);
        });

        let notifier = WebhookNotifier::new(server.url("/hook")).unwrap();
        let result = notifier.publish("inbrief", "1").await;

        assert!(matches!(result, Err(PublishError::Rejected(503))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = WebhookNotifier::new(format!("http://{addr}/hook")).unwrap();
        let result = notifier.publish("inbrief", "1").await;

        assert!(matches!(result, Err(PublishError::Transport(_))));
    }
}
