//! Fast lifecycle store.
//!
//! Owns every [`FastRecord`] and the pointer to the current one. The whole
//! collection is written back through the [`BlobStore`] after each change.
//!
//! ## State Transitions
//!
//! ```text
//! (create) -> Active -> Completed
//! ```
//!
//! `Completed` is terminal. Completion happens three ways: the user ends the
//! fast, [`FastStore::reconcile`] finds it past its end time on startup, or
//! [`OverlapPolicy::CompletePrevious`] closes it when a new fast starts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::{FastCollection, FastRecord, FastStats};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::BlobStore;

/// Storage key of the fast collection blob.
pub const FAST_STORE_KEY: &str = "randomfast-store";

/// What `create_fast` does when a fast is already active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Create anyway. The older record stays `Active` but loses the
    /// current pointer.
    #[default]
    Allow,
    /// Refuse with [`ValidationError::FastAlreadyActive`].
    Reject,
    /// Complete the older record now, then create.
    CompletePrevious,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FastBlob {
    #[serde(default)]
    fasts: Vec<FastRecord>,
    #[serde(default)]
    current_fast: Option<FastRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FastBlobRef<'a> {
    fasts: &'a [FastRecord],
    current_fast: Option<&'a FastRecord>,
}

/// Persisted fast collection with its lifecycle operations.
pub struct FastStore<B: BlobStore, C: Clock> {
    storage: B,
    clock: C,
    collection: FastCollection,
    overlap_policy: OverlapPolicy,
}

impl<B: BlobStore, C: Clock> FastStore<B, C> {
    /// Load the collection from `storage`.
    ///
    /// A missing or unreadable blob yields an empty collection.
    ///
    /// # Errors
    /// Returns an error only if the storage medium itself fails.
    pub fn open(storage: B, clock: C) -> Result<Self> {
        let collection = match storage.load(FAST_STORE_KEY)? {
            Some(raw) => Self::decode(&raw),
            None => FastCollection::default(),
        };
        tracing::debug!(records = collection.records.len(), "fast store loaded");
        Ok(Self {
            storage,
            clock,
            collection,
            overlap_policy: OverlapPolicy::default(),
        })
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    fn decode(raw: &str) -> FastCollection {
        let blob: FastBlob = match serde_json::from_str(raw) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "fast store blob unreadable, starting empty");
                return FastCollection::default();
            }
        };
        let current_fast_id = blob
            .current_fast
            .map(|r| r.id)
            .filter(|id| blob.fasts.iter().any(|r| &r.id == id));
        FastCollection {
            records: blob.fasts,
            current_fast_id,
        }
    }

    fn save(&self) -> Result<()> {
        let blob = FastBlobRef {
            fasts: &self.collection.records,
            current_fast: self.collection.current_fast(),
        };
        let json = serde_json::to_string(&blob)?;
        self.storage.save(FAST_STORE_KEY, &json)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn collection(&self) -> &FastCollection {
        &self.collection
    }

    pub fn records(&self) -> &[FastRecord] {
        self.collection.records()
    }

    pub fn current_fast_id(&self) -> Option<&str> {
        self.collection.current_fast_id()
    }

    pub fn current_fast(&self) -> Option<&FastRecord> {
        self.collection.current_fast()
    }

    pub fn get(&self, id: &str) -> Option<&FastRecord> {
        self.collection.get(id)
    }

    pub fn stats(&self) -> FastStats {
        self.collection.stats()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start tracking a fast of `duration_hours` beginning at `start_time`.
    ///
    /// # Errors
    /// Returns a validation error for a duration outside
    /// `(0, MAX_DURATION_HOURS]`, an end time past the calendar, or, under
    /// [`OverlapPolicy::Reject`], while another fast is active. Storage
    /// failures propagate.
    pub fn create_fast(&mut self, start_time: DateTime<Utc>, duration_hours: f64) -> Result<Event> {
        let record = FastRecord::new(Uuid::new_v4().to_string(), start_time, duration_hours)?;

        let now = self.clock.now();
        if let Some(active_id) = self.collection.first_active().map(|r| r.id.clone()) {
            match self.overlap_policy {
                OverlapPolicy::Allow => {
                    tracing::warn!(id = %active_id, "creating a fast while another is still active");
                }
                OverlapPolicy::Reject => {
                    return Err(ValidationError::FastAlreadyActive { id: active_id }.into());
                }
                OverlapPolicy::CompletePrevious => {
                    for previous in self.collection.records.iter_mut().filter(|r| r.is_active()) {
                        previous.complete(now);
                        tracing::info!(id = %previous.id, "completed previous fast before starting a new one");
                    }
                }
            }
        }

        let event = Event::FastCreated {
            id: record.id.clone(),
            start_time: record.start_time,
            end_time: record.end_time,
            duration_hours: record.duration_hours,
            at: now,
        };
        tracing::debug!(id = %record.id, duration_hours, "fast created");

        self.collection.current_fast_id = Some(record.id.clone());
        self.collection.records.insert(0, record);
        self.save()?;
        Ok(event)
    }

    /// End the fast `id` now. Unknown or already completed ids are ignored.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn complete_fast(&mut self, id: &str) -> Result<Option<Event>> {
        let now = self.clock.now();
        let Some(record) = self.collection.get_mut(id) else {
            tracing::debug!(id, "complete_fast: no such fast");
            return Ok(None);
        };
        if !record.complete(now) {
            tracing::debug!(id, "complete_fast: already completed");
            return Ok(None);
        }
        let early = record.ended_early();

        if self.collection.is_current(id) {
            self.collection.current_fast_id = None;
        }
        self.save()?;
        tracing::debug!(id, early, "fast completed");
        Ok(Some(Event::FastCompleted {
            id: id.to_string(),
            completed_at: now,
            early,
            at: now,
        }))
    }

    /// Remove the fast `id`, whatever its status. Unknown ids are ignored.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn delete_fast(&mut self, id: &str) -> Result<Option<Event>> {
        let Some(index) = self.collection.records.iter().position(|r| r.id == id) else {
            tracing::debug!(id, "delete_fast: no such fast");
            return Ok(None);
        };
        self.collection.records.remove(index);

        let was_current = self.collection.is_current(id);
        if was_current {
            self.collection.current_fast_id = None;
        }
        self.save()?;
        tracing::debug!(id, was_current, "fast deleted");
        Ok(Some(Event::FastDeleted {
            id: id.to_string(),
            was_current,
            at: self.clock.now(),
        }))
    }

    /// Startup check against the wall clock.
    ///
    /// An active fast whose end time has passed is completed as of its end
    /// time, not as of now. One still running becomes the current fast.
    /// With no active fast the pointer is cleared.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn reconcile(&mut self) -> Result<Option<Event>> {
        let now = self.clock.now();
        let active = self
            .collection
            .first_active()
            .map(|r| (r.id.clone(), r.end_time));

        match active {
            Some((id, end_time)) if end_time <= now => {
                if let Some(record) = self.collection.get_mut(&id) {
                    record.complete(end_time);
                }
                self.collection.current_fast_id = None;
                self.save()?;
                tracing::info!(id = %id, %end_time, "active fast passed its end time, completed");
                Ok(Some(Event::FastAutoCompleted {
                    id,
                    completed_at: end_time,
                    at: now,
                }))
            }
            Some((id, end_time)) => {
                if !self.collection.is_current(&id) {
                    self.collection.current_fast_id = Some(id.clone());
                    self.save()?;
                }
                tracing::info!(id = %id, %end_time, "resuming active fast");
                Ok(Some(Event::FastResumed { id, end_time, at: now }))
            }
            None => {
                if self.collection.current_fast_id.take().is_some() {
                    self.save()?;
                }
                Ok(None)
            }
        }
    }
}
