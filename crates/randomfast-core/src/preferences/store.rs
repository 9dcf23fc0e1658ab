use serde::{Deserialize, Serialize};

use super::{validate_timeframes, PreferencesState, PreferencesUpdate};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::sampler::{validate_duration_hours, TimeframeOption};
use crate::storage::BlobStore;

/// Storage key of the preferences blob.
pub const PREFERENCES_KEY: &str = "randomfast-preferences";

/// Lenient mirror of the stored shape; every field may be missing.
#[derive(Debug, Default, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    timeframes: Option<Vec<TimeframeOption>>,
    #[serde(default, rename = "allowReroll")]
    allow_reroll: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PreferencesBlob {
    #[serde(default)]
    preferences: Option<StoredPreferences>,
}

#[derive(Serialize)]
struct PreferencesBlobRef<'a> {
    preferences: &'a PreferencesState,
}

/// Persisted preferences.
///
/// Loading never fails on bad data: the stored blob is repaired in memory
/// and the repair is written back by [`PreferencesStore::initialize`].
pub struct PreferencesStore<B: BlobStore, C: Clock> {
    storage: B,
    clock: C,
    state: PreferencesState,
    /// Repairs made while loading that have not been persisted yet.
    pending_repairs: Vec<String>,
}

impl<B: BlobStore, C: Clock> PreferencesStore<B, C> {
    /// Load preferences from `storage`, repairing what is missing.
    ///
    /// # Errors
    /// Returns an error only if the storage medium itself fails.
    pub fn open(storage: B, clock: C) -> Result<Self> {
        let mut pending_repairs = Vec::new();
        let stored = match storage.load(PREFERENCES_KEY)? {
            None => {
                pending_repairs.push("no stored preferences".to_string());
                StoredPreferences::default()
            }
            Some(raw) => match serde_json::from_str::<PreferencesBlob>(&raw) {
                Ok(blob) => blob.preferences.unwrap_or_else(|| {
                    pending_repairs.push("preferences missing from blob".to_string());
                    StoredPreferences::default()
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "preferences blob unreadable, using defaults");
                    pending_repairs.push("unreadable preferences blob".to_string());
                    StoredPreferences::default()
                }
            },
        };

        let state = Self::rehydrate(stored, &mut pending_repairs);
        if !pending_repairs.is_empty() {
            tracing::debug!(repairs = ?pending_repairs, "preferences repaired on load");
        }

        Ok(Self {
            storage,
            clock,
            state,
            pending_repairs,
        })
    }

    fn rehydrate(stored: StoredPreferences, repairs: &mut Vec<String>) -> PreferencesState {
        let mut timeframes = stored.timeframes.unwrap_or_default();

        let before = timeframes.len();
        timeframes.retain(|o| validate_duration_hours("duration", o.duration_hours).is_ok());
        if timeframes.len() != before {
            repairs.push(format!(
                "dropped {} timeframe(s) with invalid duration",
                before - timeframes.len()
            ));
        }
        for option in &mut timeframes {
            if !option.weight.is_finite() || option.weight < 0.0 {
                repairs.push(format!(
                    "reset invalid weight {} for {}h",
                    option.weight, option.duration_hours
                ));
                option.weight = 0.0;
            }
        }

        if timeframes.is_empty() {
            if !repairs.iter().any(|r| r.starts_with("no stored") || r.starts_with("unreadable")) {
                repairs.push("empty timeframe list reset to defaults".to_string());
            }
            return PreferencesState::default();
        }

        let allow_reroll = stored.allow_reroll.unwrap_or_else(|| {
            repairs.push("allowReroll missing, set to true".to_string());
            true
        });

        PreferencesState {
            timeframes,
            allow_reroll,
        }
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&PreferencesBlobRef {
            preferences: &self.state,
        })?;
        self.storage.save(PREFERENCES_KEY, &json)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn preferences(&self) -> &PreferencesState {
        &self.state
    }

    pub fn timeframes(&self) -> &[TimeframeOption] {
        &self.state.timeframes
    }

    pub fn allow_reroll(&self) -> bool {
        self.state.allow_reroll
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Make sure the stored preferences are usable. Safe to call on every
    /// start; writes only when something had to be repaired.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn initialize(&mut self) -> Result<Option<Event>> {
        if self.state.timeframes.is_empty() {
            self.state = PreferencesState::default();
            self.pending_repairs
                .push("empty timeframe list reset to defaults".to_string());
        }
        if self.pending_repairs.is_empty() {
            return Ok(None);
        }

        self.save()?;
        let reason = std::mem::take(&mut self.pending_repairs).join("; ");
        tracing::info!(%reason, "preferences initialized");
        Ok(Some(Event::PreferencesRepaired {
            reason,
            at: self.clock.now(),
        }))
    }

    /// Merge the supplied fields into the current preferences and save.
    ///
    /// # Errors
    /// Rejects invalid timeframe lists; storage failures propagate.
    pub fn update(&mut self, update: PreferencesUpdate) -> Result<Event> {
        if let Some(timeframes) = &update.timeframes {
            validate_timeframes(timeframes)?;
        }

        let timeframes_changed = update.timeframes.is_some();
        let allow_reroll_changed = update.allow_reroll.is_some();
        if let Some(timeframes) = update.timeframes {
            self.state.timeframes = timeframes;
        }
        if let Some(allow) = update.allow_reroll {
            self.state.allow_reroll = allow;
        }

        self.save()?;
        tracing::debug!(timeframes_changed, allow_reroll_changed, "preferences updated");
        Ok(Event::PreferencesUpdated {
            timeframes_changed,
            allow_reroll_changed,
            at: self.clock.now(),
        })
    }

    /// Restore the built-in defaults and save.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn reset(&mut self) -> Result<Event> {
        self.state = PreferencesState::default();
        self.pending_repairs.clear();
        self.save()?;
        Ok(Event::PreferencesUpdated {
            timeframes_changed: true,
            allow_reroll_changed: true,
            at: self.clock.now(),
        })
    }
}
