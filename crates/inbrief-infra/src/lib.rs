//! Infrastructure layer for inbrief.
//!
//! Contains implementations of the ports defined in `inbrief-core`: a local
//! filesystem blob store, the notification topic (in-process broadcast plus
//! an optional HTTP webhook), the NDJSON update source, and the JSON chat
//! directory snapshot used as resolver and history client. Also owns config
//! file loading and data directory resolution.

pub mod config;
pub mod notify;
pub mod source;
pub mod storage;
