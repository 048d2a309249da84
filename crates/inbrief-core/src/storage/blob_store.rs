//! Blob store trait.

use inbrief_types::error::BlobStoreError;

/// Write-only object storage as seen by the flush worker.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// The worker reuses one handle sequentially; implementations do not need to
/// support concurrent puts to the same key.
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key`, replacing any previous blob.
    fn put(
        &self,
        key: &str,
        body: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<(), BlobStoreError>> + Send;
}
