//! Turning raw chat data into [`Event`](inbrief_types::event::Event)s.
//!
//! - `listener` -- consumes the real-time update stream
//! - `history` -- pages backward through stored history on demand
//!
//! Both resolve the chat's public name and run the sanitizer; their output
//! feeds the same fan-in / aggregation surface.

pub mod history;
pub mod listener;

pub use history::{HISTORY_PAGE_LIMIT, HistoryFetcher, forward};
pub use listener::{ListenerStats, UpdateListener};
