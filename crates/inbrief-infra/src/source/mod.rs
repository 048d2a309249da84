//! Chat source infrastructure.
//!
//! - `jsonl` -- reads raw updates from newline-delimited JSON
//! - `directory` -- a JSON snapshot of chats, folders and message history,
//!   implementing `ChatResolver` and `HistoryClient` from `inbrief-core`

pub mod directory;
pub mod jsonl;

pub use directory::SnapshotDirectory;
pub use jsonl::{ReaderStats, UpdateInput, read_updates, spawn_update_reader};
