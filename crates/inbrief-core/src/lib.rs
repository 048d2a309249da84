//! Ingest pipeline logic and collaborator trait definitions for inbrief.
//!
//! This crate defines the "ports" (blob store, notification topic, chat
//! resolver, history client) that the infrastructure layer implements, plus
//! everything that runs between them: text sanitization, the fan-in merge,
//! the aggregator event loop and the flush worker. It depends only on
//! `inbrief-types` -- never on `inbrief-infra` or any IO crate.

pub mod channel;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod sanitize;
pub mod source;
pub mod storage;
