//! Weighted random duration selection.
//!
//! Given the user's timeframe options, [`sample`] picks one duration with
//! probability proportional to its weight. Weights are unnormalized; the
//! walk is inverse-CDF sampling over the running sum.
//!
//! ## Degenerate input
//!
//! - no options: [`FALLBACK_DURATION_HOURS`]
//! - all weights zero: uniform choice among the options

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Duration returned when there is nothing to sample from.
pub const FALLBACK_DURATION_HOURS: f64 = 16.0;

/// Longest accepted fast, one year.
pub const MAX_DURATION_HOURS: f64 = 24.0 * 365.0;

/// A candidate fast length with its relative likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeframeOption {
    #[serde(rename = "duration")]
    pub duration_hours: f64,
    #[serde(rename = "likelihood", default)]
    pub weight: f64,
}

impl TimeframeOption {
    pub const fn new(duration_hours: f64, weight: f64) -> Self {
        Self {
            duration_hours,
            weight,
        }
    }
}

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// PCG-backed random source.
#[derive(Debug, Clone)]
pub struct PcgSource {
    rng: Mcg128Xsl64,
}

impl PcgSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Deterministic source for reproducible rolls.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for PcgSource {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Pick one duration from `options`, weighted by `weight`.
///
/// Weights must be non-negative; validate them before they get here.
pub fn sample<R: RandomSource + ?Sized>(options: &[TimeframeOption], rng: &mut R) -> f64 {
    let Some(first) = options.first() else {
        tracing::debug!("no timeframe options, using fallback duration");
        return FALLBACK_DURATION_HOURS;
    };

    let total: f64 = options.iter().map(|o| o.weight).sum();
    if total == 0.0 {
        let index = ((rng.next_f64() * options.len() as f64) as usize).min(options.len() - 1);
        tracing::debug!(index, "all weights zero, uniform selection");
        return options[index].duration_hours;
    }

    let r = rng.next_f64() * total;
    let mut acc = 0.0;
    for option in options {
        acc += option.weight;
        if r <= acc {
            tracing::debug!(r, total, duration = option.duration_hours, "sampled duration");
            return option.duration_hours;
        }
    }

    // Unreachable while r < total, kept for float edge cases.
    first.duration_hours
}

/// A sampled candidate waiting for the user to commit or re-roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roll {
    pub start_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub end_time: DateTime<Utc>,
    /// How many times this candidate has been re-rolled.
    #[serde(default)]
    pub rerolls: u32,
}

impl Roll {
    /// Sample a first candidate for a fast starting at `start_time`.
    ///
    /// # Errors
    /// Fails if the drawn duration is out of range.
    pub fn new<R: RandomSource + ?Sized>(
        start_time: DateTime<Utc>,
        options: &[TimeframeOption],
        rng: &mut R,
    ) -> Result<Self> {
        let duration_hours = sample(options, rng);
        Ok(Self {
            start_time,
            duration_hours,
            end_time: end_time_after(start_time, duration_hours)?,
            rerolls: 0,
        })
    }

    /// Replace the candidate with a fresh draw, if re-rolling is allowed.
    ///
    /// # Errors
    /// Fails with `RerollDisabled` when re-rolling is off, or if the new draw
    /// is out of range. The candidate is unchanged on error.
    pub fn reroll<R: RandomSource + ?Sized>(
        &mut self,
        options: &[TimeframeOption],
        allow_reroll: bool,
        rng: &mut R,
    ) -> Result<()> {
        if !allow_reroll {
            return Err(ValidationError::RerollDisabled.into());
        }
        let duration_hours = sample(options, rng);
        self.end_time = end_time_after(self.start_time, duration_hours)?;
        self.duration_hours = duration_hours;
        self.rerolls += 1;
        Ok(())
    }

    /// Move the candidate to a new start, keeping its duration.
    ///
    /// # Errors
    /// Fails if the end time is not representable.
    pub fn start_at(&mut self, start_time: DateTime<Utc>) -> Result<()> {
        self.end_time = end_time_after(start_time, self.duration_hours)?;
        self.start_time = start_time;
        Ok(())
    }
}

/// Check that `hours` is a usable fast length: finite, positive and at most
/// [`MAX_DURATION_HOURS`].
///
/// # Errors
/// Returns `InvalidValue` naming `field`.
pub fn validate_duration_hours(field: &str, hours: f64) -> Result<()> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_DURATION_HOURS {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("must be between 0 and {MAX_DURATION_HOURS} hours, got {hours}"),
        }
        .into());
    }
    Ok(())
}

/// Convert fractional hours to a millisecond-precision duration.
///
/// `None` if the value does not fit.
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    let ms = (hours * 3_600_000.0).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(ms as i64)
}

/// End of a fast of `hours` starting at `start_time`.
///
/// # Errors
/// Rejects durations outside `(0, MAX_DURATION_HOURS]` and end times past
/// the representable range.
pub fn end_time_after(start_time: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>> {
    validate_duration_hours("duration_hours", hours)?;
    hours_to_duration(hours)
        .and_then(|d| start_time.checked_add_signed(d))
        .ok_or_else(|| {
            ValidationError::InvalidValue {
                field: "end_time".into(),
                message: format!("{hours} hours after {start_time} is out of range"),
            }
            .into()
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Replays a fixed list of draws, cycling when exhausted.
    pub(crate) struct ScriptedSource {
        draws: Vec<f64>,
        next: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn next_f64(&mut self) -> f64 {
            let v = self.draws[self.next % self.draws.len()];
            self.next += 1;
            v
        }
    }

    fn opts(pairs: &[(f64, f64)]) -> Vec<TimeframeOption> {
        pairs
            .iter()
            .map(|&(d, w)| TimeframeOption::new(d, w))
            .collect()
    }

    #[test]
    fn empty_options_fall_back_to_sixteen() {
        let mut rng = ScriptedSource::new(&[0.5]);
        assert_eq!(sample(&[], &mut rng), 16.0);
    }

    #[test]
    fn walks_cumulative_weights() {
        let options = opts(&[(10.0, 1.0), (20.0, 3.0)]);
        // total = 4; r = 0.2 * 4 = 0.8 <= 1
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.2])), 10.0);
        // r = 0.25 * 4 = 1.0, boundary goes to the first option
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.25])), 10.0);
        // r = 0.3 * 4 = 1.2 > 1
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.3])), 20.0);
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.999])), 20.0);
    }

    #[test]
    fn zero_weight_options_are_skipped() {
        let options = opts(&[(12.0, 0.0), (16.0, 5.0), (18.0, 0.0)]);
        let mut rng = ScriptedSource::new(&[0.01, 0.5, 0.99]);
        for _ in 0..3 {
            assert_eq!(sample(&options, &mut rng), 16.0);
        }
    }

    #[test]
    fn all_zero_weights_select_uniformly() {
        let options = opts(&[(10.0, 0.0), (20.0, 0.0)]);
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.1])), 10.0);
        assert_eq!(sample(&options, &mut ScriptedSource::new(&[0.7])), 20.0);
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let options = opts(&[(12.0, 20.0), (16.0, 30.0), (48.0, 2.0)]);
        let mut a = PcgSource::seeded(7);
        let mut b = PcgSource::seeded(7);
        for _ in 0..50 {
            assert_eq!(sample(&options, &mut a), sample(&options, &mut b));
        }
    }

    #[test]
    fn roll_computes_end_time_and_respects_reroll_flag() {
        let start = Utc::now();
        let options = opts(&[(10.0, 1.0), (20.0, 3.0)]);
        let mut rng = ScriptedSource::new(&[0.1, 0.9]);

        let mut roll = Roll::new(start, &options, &mut rng).unwrap();
        assert_eq!(roll.duration_hours, 10.0);
        assert_eq!(roll.end_time, start + Duration::hours(10));

        roll.reroll(&options, true, &mut rng).unwrap();
        assert_eq!(roll.duration_hours, 20.0);
        assert_eq!(roll.end_time, start + Duration::hours(20));
        assert_eq!(roll.rerolls, 1);

        let err = roll.reroll(&options, false, &mut rng).unwrap_err();
        assert!(err.to_string().contains("Re-roll is disabled"));
        assert_eq!(roll.duration_hours, 20.0);
    }

    #[test]
    fn fractional_hours_convert_to_milliseconds() {
        assert_eq!(hours_to_duration(1.5), Some(Duration::minutes(90)));
        assert_eq!(hours_to_duration(0.25), Some(Duration::minutes(15)));
        assert_eq!(hours_to_duration(1e20), None);
        assert_eq!(hours_to_duration(f64::INFINITY), None);
    }

    #[test]
    fn huge_durations_are_errors_not_panics() {
        let start = Utc::now();
        assert!(end_time_after(start, 1e10).is_err());
        assert!(end_time_after(start, MAX_DURATION_HOURS + 1.0).is_err());
        assert!(end_time_after(start, MAX_DURATION_HOURS).is_ok());
        assert!(end_time_after(DateTime::<Utc>::MAX_UTC, 1.0).is_err());

        let options = opts(&[(1e10, 1.0)]);
        let mut rng = ScriptedSource::new(&[0.5]);
        assert!(Roll::new(start, &options, &mut rng).is_err());

        let mut roll = Roll::new(start, &opts(&[(16.0, 1.0)]), &mut rng).unwrap();
        assert!(roll.reroll(&options, true, &mut rng).is_err());
        assert_eq!(roll.duration_hours, 16.0);
        assert_eq!(roll.rerolls, 0);
    }

    #[test]
    fn start_at_shifts_end_time() {
        let start = Utc::now();
        let mut rng = ScriptedSource::new(&[0.5]);
        let mut roll = Roll::new(start, &opts(&[(16.0, 1.0)]), &mut rng).unwrap();
        roll.start_at(start + Duration::hours(2)).unwrap();
        assert_eq!(roll.end_time, start + Duration::hours(18));
    }

    proptest! {
        #[test]
        fn sample_returns_one_of_the_inputs(
            options in prop::collection::vec((0.5f64..72.0, 0.001f64..100.0), 1..10),
            seed in any::<u64>(),
        ) {
            let options = opts(&options);
            let mut rng = PcgSource::seeded(seed);
            let picked = sample(&options, &mut rng);
            prop_assert!(options.iter().any(|o| o.duration_hours == picked));
        }
    }
}
