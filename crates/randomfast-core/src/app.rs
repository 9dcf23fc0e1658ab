//! Root composition: both stores plus the clock and random source they
//! share, wired once at startup.
//!
//! ## Usage
//!
//! ```ignore
//! let db = Database::open()?;
//! let (mut app, startup) = App::start(&db, SystemClock, PcgSource::from_entropy())?;
//! let roll = app.roll(Utc::now())?;
//! app.commit(&roll)?;
//! ```

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::fast::{FastStore, OverlapPolicy};
use crate::preferences::PreferencesStore;
use crate::sampler::{RandomSource, Roll};
use crate::storage::BlobStore;

/// Storage key of a sampled-but-uncommitted roll.
pub const PENDING_ROLL_KEY: &str = "randomfast-pending-roll";

pub struct App<B: BlobStore, C: Clock, R: RandomSource> {
    pub fasts: FastStore<B, C>,
    pub preferences: PreferencesStore<B, C>,
    storage: B,
    rng: R,
}

impl<B, C, R> App<B, C, R>
where
    B: BlobStore + Clone,
    C: Clock + Clone,
    R: RandomSource,
{
    /// Open both stores and run the startup routine: repair preferences,
    /// then reconcile the active fast against the clock.
    ///
    /// Returns the events the startup produced.
    ///
    /// # Errors
    /// Storage failures propagate.
    pub fn start(storage: B, clock: C, rng: R) -> Result<(Self, Vec<Event>)> {
        let preferences = PreferencesStore::open(storage.clone(), clock.clone())?;
        let fasts = FastStore::open(storage.clone(), clock)?;
        let mut app = Self {
            fasts,
            preferences,
            storage,
            rng,
        };

        let mut events = Vec::new();
        events.extend(app.preferences.initialize()?);
        events.extend(app.fasts.reconcile()?);
        Ok((app, events))
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.fasts = self.fasts.with_overlap_policy(policy);
        self
    }

    /// Sample a candidate duration for a fast starting at `start_time`.
    ///
    /// # Errors
    /// See [`Roll::new`].
    pub fn roll(&mut self, start_time: DateTime<Utc>) -> Result<Roll> {
        Roll::new(start_time, self.preferences.timeframes(), &mut self.rng)
    }

    /// Re-sample `roll` in place, if preferences allow it.
    ///
    /// # Errors
    /// Fails with `RerollDisabled` when re-rolling is switched off.
    pub fn reroll(&mut self, roll: &mut Roll) -> Result<()> {
        roll.reroll(
            self.preferences.timeframes(),
            self.preferences.allow_reroll(),
            &mut self.rng,
        )
    }

    /// Turn a roll into a tracked fast and drop any pending roll.
    ///
    /// # Errors
    /// See [`FastStore::create_fast`].
    pub fn commit(&mut self, roll: &Roll) -> Result<Event> {
        let event = self.fasts.create_fast(roll.start_time, roll.duration_hours)?;
        self.clear_pending_roll()?;
        Ok(event)
    }

    /// Roll kept between invocations, if any. Unreadable data counts as none.
    pub fn pending_roll(&self) -> Result<Option<Roll>> {
        let Some(raw) = self.storage.load(PENDING_ROLL_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Option<Roll>>(&raw) {
            Ok(roll) => Ok(roll),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable pending roll");
                Ok(None)
            }
        }
    }

    pub fn save_pending_roll(&self, roll: &Roll) -> Result<()> {
        let json = serde_json::to_string(roll)?;
        self.storage.save(PENDING_ROLL_KEY, &json)
    }

    pub fn clear_pending_roll(&self) -> Result<()> {
        if self.storage.load(PENDING_ROLL_KEY)?.is_some_and(|raw| raw != "null") {
            self.storage.save(PENDING_ROLL_KEY, "null")?;
        }
        Ok(())
    }
}
