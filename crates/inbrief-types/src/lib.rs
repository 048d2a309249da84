//! Shared domain types for inbrief.
//!
//! This crate contains the values that flow through the ingest pipeline:
//! raw chat updates, formatted text with its entity spans, sanitized events,
//! batch identifiers, configuration, and the error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod batch;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod text;
pub mod update;
