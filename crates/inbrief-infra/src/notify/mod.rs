//! Notification topic infrastructure.
//!
//! - `webhook` -- POSTs each announcement to an HTTP endpoint
//! - `topic` -- the notifier the pipeline uses: in-process broadcast, mirrored
//!   to the webhook when one is configured

pub mod topic;
pub mod webhook;

pub use topic::TopicNotifier;
pub use webhook::WebhookNotifier;
