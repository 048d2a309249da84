//! Storage abstractions for inbrief.
//!
//! Defines the blob store trait the flush worker writes batches through.
//! Implementations live in inbrief-infra.

pub mod blob_store;

pub use blob_store::BlobStore;
