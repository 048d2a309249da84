//! HTTP API layer for inbrief.
//!
//! Axum-based API at `/api/v1/` with envelope responses and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
