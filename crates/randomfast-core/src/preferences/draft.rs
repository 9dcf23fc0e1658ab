use super::{
    normalize_weights, validate_timeframes, PreferencesState, PreferencesUpdate,
    NEW_TIMEFRAME_WEIGHT,
};
use crate::error::{Result, ValidationError};
use crate::sampler::{validate_duration_hours, TimeframeOption};

/// Working copy of the timeframe list while the user edits it.
///
/// Nothing is stored until [`TimeframeDraft::into_update`] hands back a
/// normalized update for [`super::PreferencesStore::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeDraft {
    timeframes: Vec<TimeframeOption>,
}

impl TimeframeDraft {
    pub fn new(timeframes: Vec<TimeframeOption>) -> Self {
        Self { timeframes }
    }

    pub fn from_preferences(preferences: &PreferencesState) -> Self {
        Self::new(preferences.timeframes.clone())
    }

    pub fn timeframes(&self) -> &[TimeframeOption] {
        &self.timeframes
    }

    /// Append a timeframe with the default weight.
    pub fn add(&mut self, duration_hours: f64) -> Result<()> {
        validate_duration_hours("duration", duration_hours)?;
        self.timeframes
            .push(TimeframeOption::new(duration_hours, NEW_TIMEFRAME_WEIGHT));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<TimeframeOption> {
        self.check_index(index)?;
        Ok(self.timeframes.remove(index))
    }

    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        self.check_index(index)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "likelihood".into(),
                message: format!("must be non-negative, got {weight}"),
            }
            .into());
        }
        self.timeframes[index].weight = weight;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.timeframes.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "timeframes".into(),
                index,
                len: self.timeframes.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Normalize and package the draft for saving. An empty draft is refused.
    pub fn into_update(self) -> Result<PreferencesUpdate> {
        if self.timeframes.is_empty() {
            return Err(ValidationError::EmptyCollection("timeframes".into()).into());
        }
        let normalized = normalize_weights(&self.timeframes);
        validate_timeframes(&normalized)?;
        Ok(PreferencesUpdate::timeframes(normalized))
    }
}
