//! Fast records and the collection that owns them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sampler::end_time_after;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastStatus {
    Active,
    Completed,
}

/// One tracked fast.
///
/// `end_time` is fixed at creation. The only change a record ever sees is
/// `Active -> Completed`, which fills in `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "duration", alias = "durationHours")]
    pub duration_hours: f64,
    pub status: FastStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl FastRecord {
    /// A new active record ending `duration_hours` after `start_time`.
    ///
    /// # Errors
    /// Rejects durations that are not positive, exceed
    /// [`crate::sampler::MAX_DURATION_HOURS`], or overflow the calendar.
    pub fn new(id: String, start_time: DateTime<Utc>, duration_hours: f64) -> Result<Self> {
        Ok(Self {
            id,
            start_time,
            end_time: end_time_after(start_time, duration_hours)?,
            duration_hours,
            status: FastStatus::Active,
            completed_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == FastStatus::Active
    }

    /// Planned length, `end_time - start_time`.
    pub fn planned(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether the target end time has been reached at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// Hours actually fasted, to one decimal. Completed records count up to
    /// `completed_at` (or `end_time` when that is missing), active ones up
    /// to `now`.
    pub fn actual_hours(&self, now: DateTime<Utc>) -> f64 {
        let end = match self.status {
            FastStatus::Completed => self.completed_at.unwrap_or(self.end_time),
            FastStatus::Active => now,
        };
        let hours = (end - self.start_time).num_milliseconds() as f64 / 3_600_000.0;
        (hours * 10.0).round() / 10.0
    }

    /// Whether the fast was ended before its target.
    pub fn ended_early(&self) -> bool {
        self.completed_at.is_some_and(|at| at < self.end_time)
    }

    /// Move to `Completed`. Returns `false` if already completed.
    pub(crate) fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != FastStatus::Active {
            return false;
        }
        self.status = FastStatus::Completed;
        self.completed_at = Some(at);
        true
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastStats {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
    /// Sum of actual fasted hours over completed records.
    pub completed_hours: f64,
    /// Completed records that reached their target end time.
    pub reached_target: usize,
}

/// All records, newest first, plus the pointer to the current fast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastCollection {
    pub(crate) records: Vec<FastRecord>,
    pub(crate) current_fast_id: Option<String>,
}

impl FastCollection {
    pub fn records(&self) -> &[FastRecord] {
        &self.records
    }

    pub fn current_fast_id(&self) -> Option<&str> {
        self.current_fast_id.as_deref()
    }

    pub fn current_fast(&self) -> Option<&FastRecord> {
        let id = self.current_fast_id.as_deref()?;
        self.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&FastRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut FastRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// The newest record still marked active.
    pub fn first_active(&self) -> Option<&FastRecord> {
        self.records.iter().find(|r| r.is_active())
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current_fast_id.as_deref() == Some(id)
    }

    pub fn stats(&self) -> FastStats {
        let mut stats = FastStats {
            total: self.records.len(),
            ..FastStats::default()
        };
        for record in &self.records {
            match record.status {
                FastStatus::Active => stats.active += 1,
                FastStatus::Completed => {
                    stats.completed += 1;
                    if let Some(at) = record.completed_at {
                        let fasted = (at - record.start_time).num_milliseconds().max(0);
                        stats.completed_hours += fasted as f64 / 3_600_000.0;
                        if at >= record.end_time {
                            stats.reached_target += 1;
                        }
                    }
                }
            }
        }
        stats
    }
}
