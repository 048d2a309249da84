//! Blob storage infrastructure.
//!
//! Implements the `BlobStore` trait from `inbrief-core` on the local
//! filesystem.

pub mod local;

pub use local::LocalBlobStore;
