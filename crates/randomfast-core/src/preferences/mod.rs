//! User preferences: the timeframe distribution and the re-roll switch.
//!
//! - [`PreferencesStore`]: persisted state with load-time repair
//! - [`TimeframeDraft`]: local copy edited in settings, normalized on save
//! - [`normalize_weights`]: rescale weights to percentages

mod draft;
mod store;

pub use draft::TimeframeDraft;
pub use store::{PreferencesStore, PREFERENCES_KEY};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::sampler::{validate_duration_hours, TimeframeOption};

/// Built-in distribution used on first run and whenever the stored list is
/// found empty.
pub const DEFAULT_TIMEFRAMES: [TimeframeOption; 6] = [
    TimeframeOption::new(12.0, 20.0),
    TimeframeOption::new(16.0, 30.0),
    TimeframeOption::new(18.0, 25.0),
    TimeframeOption::new(20.0, 15.0),
    TimeframeOption::new(24.0, 8.0),
    TimeframeOption::new(48.0, 2.0),
];

/// Weight given to a timeframe added in settings.
pub const NEW_TIMEFRAME_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesState {
    /// Display order only; sampling does not depend on it.
    pub timeframes: Vec<TimeframeOption>,
    pub allow_reroll: bool,
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self {
            timeframes: DEFAULT_TIMEFRAMES.to_vec(),
            allow_reroll: true,
        }
    }
}

/// Partial update. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframes: Option<Vec<TimeframeOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reroll: Option<bool>,
}

impl PreferencesUpdate {
    pub fn timeframes(timeframes: Vec<TimeframeOption>) -> Self {
        Self {
            timeframes: Some(timeframes),
            allow_reroll: None,
        }
    }

    pub fn allow_reroll(allow: bool) -> Self {
        Self {
            timeframes: None,
            allow_reroll: Some(allow),
        }
    }
}

/// Rescale weights so they read as percentages.
///
/// A positive sum maps each weight to `weight / sum * 100`, rounded to two
/// decimals. A zero sum spreads `100 / count` evenly.
pub fn normalize_weights(options: &[TimeframeOption]) -> Vec<TimeframeOption> {
    let total: f64 = options.iter().map(|o| o.weight).sum();
    if total > 0.0 {
        options
            .iter()
            .map(|o| TimeframeOption {
                weight: (o.weight / total * 100.0 * 100.0).round() / 100.0,
                ..*o
            })
            .collect()
    } else {
        let even = 100.0 / options.len() as f64;
        options
            .iter()
            .map(|o| TimeframeOption { weight: even, ..*o })
            .collect()
    }
}

/// Check a timeframe list before it is stored.
///
/// # Errors
/// Empty lists, durations outside `(0, MAX_DURATION_HOURS]`, and negative
/// or non-finite weights are rejected.
pub fn validate_timeframes(options: &[TimeframeOption]) -> Result<()> {
    if options.is_empty() {
        return Err(ValidationError::EmptyCollection("timeframes".into()).into());
    }
    for (i, option) in options.iter().enumerate() {
        validate_duration_hours(&format!("timeframes[{i}].duration"), option.duration_hours)?;
        if !option.weight.is_finite() || option.weight < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("timeframes[{i}].likelihood"),
                message: format!("must be non-negative, got {}", option.weight),
            }
            .into());
        }
    }
    Ok(())
}
