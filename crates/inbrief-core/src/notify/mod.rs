//! Batch availability announcements.
//!
//! - `Notifier` -- the publish port the flush worker calls after persisting
//! - `broadcast` -- in-process topic built on `tokio::sync::broadcast`

pub mod broadcast;

use inbrief_types::error::PublishError;

pub use broadcast::{Announcement, BroadcastNotifier};

/// Publisher of short payloads on named topics.
pub trait Notifier: Send + Sync {
    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl std::future::Future<Output = Result<(), PublishError>> + Send;
}
