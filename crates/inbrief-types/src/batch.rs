//! Batch identifiers and the persisted batch layout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// File extension of persisted batches.
pub const BATCH_EXTENSION: &str = "json";

/// Identifier of a flushed batch: wall-clock nanoseconds at flush time.
///
/// Two flushes within the same clock tick get the same id. Nothing here
/// prevents that; flushes are far apart under any realistic cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub i64);

impl BatchId {
    /// Id for a flush happening at `at`.
    ///
    /// Dates past the nanosecond range (year 2262) saturate at microsecond
    /// precision instead of failing.
    pub fn at(at: DateTime<Utc>) -> Self {
        BatchId(
            at.timestamp_nanos_opt()
                .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1_000)),
        )
    }

    /// Id for a flush happening now.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Blob key under which the batch is stored, e.g. `1700000000000000000.json`.
    pub fn blob_key(&self) -> String {
        format!("{}.{}", self.0, BATCH_EXTENSION)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An identifier-tagged group of events flushed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    pub events: Vec<Event>,
}

impl Batch {
    pub fn new(id: BatchId, events: Vec<Event>) -> Self {
        Self { id, events }
    }

    /// Persisted body: a JSON array with one object per event.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(&self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatId;

    #[test]
    fn blob_key_uses_json_extension() {
        assert_eq!(BatchId(1_700_000_000_123_456_789).blob_key(), "1700000000123456789.json");
    }

    #[test]
    fn id_is_nanoseconds_since_epoch() {
        let at = DateTime::from_timestamp(2, 5).unwrap();
        assert_eq!(BatchId::at(at), BatchId(2_000_000_005));
    }

    #[test]
    fn later_flush_gets_larger_id() {
        let earlier = BatchId::at(DateTime::from_timestamp(10, 0).unwrap());
        let later = BatchId::at(DateTime::from_timestamp(10, 1).unwrap());
        assert!(later > earlier);
    }

    #[test]
    fn batch_body_is_json_array_of_events() {
        let ts = DateTime::from_timestamp(100, 0).unwrap();
        let batch = Batch::new(
            BatchId(1),
            vec![
                Event::new(1, ChatId(9), "first", ts, "chan"),
                Event::new(2, ChatId(9), "second", ts, "chan"),
            ],
        );
        let body = batch.to_json().unwrap();
        let parsed: Vec<Event> = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, batch.events);
    }
}
