//! Statistical checks for the duration sampler.

use randomfast_core::{sample, PcgSource, RandomSource, TimeframeOption, DEFAULT_TIMEFRAMES};

const TRIALS: usize = 10_000;

fn frequency(options: &[TimeframeOption], target: f64, seed: u64) -> f64 {
    let mut rng = PcgSource::seeded(seed);
    let hits = (0..TRIALS)
        .filter(|_| sample(options, &mut rng) == target)
        .count();
    hits as f64 / TRIALS as f64
}

#[test]
fn converges_to_weight_proportions() {
    let options = [
        TimeframeOption::new(10.0, 1.0),
        TimeframeOption::new(20.0, 3.0),
    ];
    for seed in [1, 42, 2024] {
        let share = frequency(&options, 20.0, seed);
        assert!(
            (share - 0.75).abs() <= 0.02,
            "seed {seed}: 20h drawn {share:.4} of the time"
        );
    }
}

#[test]
fn all_zero_weights_split_evenly() {
    let options = [
        TimeframeOption::new(10.0, 0.0),
        TimeframeOption::new(20.0, 0.0),
    ];
    let share = frequency(&options, 10.0, 7);
    assert!((share - 0.5).abs() <= 0.02, "10h drawn {share:.4} of the time");

    let mut rng = PcgSource::seeded(7);
    for _ in 0..1000 {
        let d = sample(&options, &mut rng);
        assert!(d == 10.0 || d == 20.0);
    }
}

#[test]
fn default_distribution_matches_weights() {
    let mut rng = PcgSource::seeded(99);
    let mut counts = [0usize; DEFAULT_TIMEFRAMES.len()];
    for _ in 0..TRIALS {
        let d = sample(&DEFAULT_TIMEFRAMES, &mut rng);
        let i = DEFAULT_TIMEFRAMES
            .iter()
            .position(|o| o.duration_hours == d)
            .expect("sampled a duration outside the options");
        counts[i] += 1;
    }
    for (option, count) in DEFAULT_TIMEFRAMES.iter().zip(counts) {
        let expected = option.weight / 100.0;
        let share = count as f64 / TRIALS as f64;
        assert!(
            (share - expected).abs() <= 0.02,
            "{}h drawn {share:.4}, expected {expected:.2}",
            option.duration_hours
        );
    }
}

#[test]
fn empty_list_returns_sixteen() {
    struct Never;
    impl RandomSource for Never {
        fn next_f64(&mut self) -> f64 {
            panic!("sampler drew from the random source for an empty list")
        }
    }
    assert_eq!(sample(&[], &mut Never), 16.0);
}
