//! Derived, non-persisted display values for a fast.
//!
//! Recomputed on every refresh tick from the record and the current time.
//! Nothing here writes back to the store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::record::FastRecord;
use crate::display::format_remaining;

/// Progress of one fast at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastProgress {
    pub id: String,
    pub elapsed_ms: i64,
    /// Time left until the target end time, never negative.
    pub remaining_ms: i64,
    /// 0.0 ..= 100.0
    pub progress_pct: f64,
    pub is_due: bool,
    /// Human-readable countdown.
    pub remaining_label: String,
}

impl FastProgress {
    pub fn at(record: &FastRecord, now: DateTime<Utc>) -> Self {
        let total = record.planned().num_milliseconds();
        let elapsed = (now - record.start_time).num_milliseconds();
        let remaining = (record.end_time - now).num_milliseconds().max(0);
        let is_due = record.is_due(now);

        let progress_pct = if is_due {
            100.0
        } else if total <= 0 {
            0.0
        } else {
            (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            id: record.id.clone(),
            elapsed_ms: elapsed,
            remaining_ms: remaining,
            progress_pct,
            is_due,
            remaining_label: format_remaining(Duration::milliseconds(remaining)),
        }
    }
}
