use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// Callers print them, log them, or ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FastCreated {
        id: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_hours: f64,
        at: DateTime<Utc>,
    },
    FastCompleted {
        id: String,
        completed_at: DateTime<Utc>,
        /// Ended before the target end time.
        early: bool,
        at: DateTime<Utc>,
    },
    FastDeleted {
        id: String,
        was_current: bool,
        at: DateTime<Utc>,
    },
    /// Startup check found the active fast already past its end time.
    FastAutoCompleted {
        id: String,
        completed_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Startup check found the active fast still running.
    FastResumed {
        id: String,
        end_time: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    PreferencesUpdated {
        timeframes_changed: bool,
        allow_reroll_changed: bool,
        at: DateTime<Utc>,
    },
    PreferencesRepaired {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Id of the fast this event is about, if any.
    pub fn fast_id(&self) -> Option<&str> {
        match self {
            Event::FastCreated { id, .. }
            | Event::FastCompleted { id, .. }
            | Event::FastDeleted { id, .. }
            | Event::FastAutoCompleted { id, .. }
            | Event::FastResumed { id, .. } => Some(id),
            Event::PreferencesUpdated { .. } | Event::PreferencesRepaired { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::FastDeleted {
            id: "abc".into(),
            was_current: true,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "FastDeleted");
        assert_eq!(json["id"], "abc");
        assert_eq!(event.fast_id(), Some("abc"));
    }
}
