//! # RandomFast Core Library
//!
//! Core logic for RandomFast, a fasting tracker whose fast lengths are drawn
//! at random from a user-weighted distribution. All rule-bearing behaviour
//! lives here; the CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Sampler**: weighted random choice of a duration from the user's
//!   timeframe options, with fixed fallbacks for degenerate input
//! - **Fast store**: persisted collection of fasts with an
//!   `Active -> Completed` lifecycle and startup reconciliation
//! - **Preferences store**: persisted timeframe distribution and re-roll
//!   switch, repaired on load
//! - **Storage**: SQLite key-value blobs and TOML configuration
//!
//! ## Key Components
//!
//! - [`App`]: Root composition of both stores
//! - [`FastStore`]: Fast lifecycle state machine
//! - [`PreferencesStore`]: Preference persistence
//! - [`sample`]: The duration sampler
//! - [`BlobStore`]: Persistence seam, implemented by [`Database`]

pub mod app;
pub mod clock;
pub mod display;
pub mod error;
pub mod events;
pub mod fast;
pub mod preferences;
pub mod sampler;
pub mod storage;

pub use app::App;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use fast::{FastCollection, FastProgress, FastRecord, FastStats, FastStatus, FastStore, OverlapPolicy};
pub use preferences::{
    normalize_weights, PreferencesState, PreferencesStore, PreferencesUpdate, TimeframeDraft,
    DEFAULT_TIMEFRAMES,
};
pub use sampler::{
    sample, PcgSource, RandomSource, Roll, TimeframeOption, FALLBACK_DURATION_HOURS,
    MAX_DURATION_HOURS,
};
pub use storage::{BlobStore, Config, Database, MemoryStore};
