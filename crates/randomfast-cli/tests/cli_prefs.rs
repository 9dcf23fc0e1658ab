//! Preferences and config through the CLI binary.

mod common;

use common::{assert_contains, parse_json, run_cli_failure, run_cli_success};

#[test]
fn show_lists_defaults() {
    let home = tempfile::tempdir().unwrap();
    let prefs = parse_json(&run_cli_success(home.path(), &["prefs", "show", "--json"]));
    let timeframes = prefs["timeframes"].as_array().unwrap();
    assert_eq!(timeframes.len(), 6);
    assert_eq!(timeframes[0]["duration"], 12.0);
    assert_eq!(timeframes[0]["likelihood"], 20.0);
    assert_eq!(prefs["allowReroll"], true);

    let text = run_cli_success(home.path(), &["prefs", "show"]);
    assert_contains(&text, "2 days");
    assert_contains(&text, "re-roll: on");
}

#[test]
fn reroll_toggle_keeps_timeframes() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["prefs", "reroll", "off"]);
    let prefs = parse_json(&run_cli_success(home.path(), &["prefs", "show", "--json"]));
    assert_eq!(prefs["allowReroll"], false);
    assert_eq!(prefs["timeframes"].as_array().unwrap().len(), 6);
}

#[test]
fn edits_are_normalized() {
    let home = tempfile::tempdir().unwrap();
    for index in ["5", "4", "3", "2"] {
        run_cli_success(home.path(), &["prefs", "remove", index]);
    }
    // [12h, 16h] left; weights now 40/60 after normalization
    run_cli_success(home.path(), &["prefs", "weight", "0", "60"]);
    run_cli_success(home.path(), &["prefs", "weight", "1", "60"]);
    run_cli_success(home.path(), &["prefs", "add", "24"]);

    let prefs = parse_json(&run_cli_success(home.path(), &["prefs", "show", "--json"]));
    let weights: Vec<f64> = prefs["timeframes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["likelihood"].as_f64().unwrap())
        .collect();
    let total: f64 = weights.iter().sum();
    assert_eq!(weights.len(), 3);
    assert!((total - 100.0).abs() < 0.05, "weights {weights:?}");
}

#[test]
fn removing_last_option_is_refused() {
    let home = tempfile::tempdir().unwrap();
    for _ in 0..5 {
        run_cli_success(home.path(), &["prefs", "remove", "0"]);
    }
    let (_, stderr, _) = run_cli_failure(home.path(), &["prefs", "remove", "0"]);
    assert_contains(&stderr, "Empty collection");
    run_cli_failure(home.path(), &["prefs", "weight", "9", "1"]);
}

#[test]
fn reset_restores_defaults() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["prefs", "remove", "0"]);
    run_cli_success(home.path(), &["prefs", "reset"]);
    let prefs = parse_json(&run_cli_success(home.path(), &["prefs", "show", "--json"]));
    assert_eq!(prefs["timeframes"].as_array().unwrap().len(), 6);
}

#[test]
fn config_get_set_reset() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "display.refresh_interval_ms"]).trim(),
        "1000"
    );
    run_cli_success(home.path(), &["config", "set", "sampler.seed", "42"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "sampler.seed"]).trim(),
        "42"
    );
    run_cli_failure(home.path(), &["config", "set", "nope.key", "1"]);
    run_cli_failure(home.path(), &["config", "get", "nope.key"]);

    run_cli_success(home.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "sampler.seed"]).trim(),
        "null"
    );
}

#[test]
fn completions_are_generated() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(home.path(), &["completions", "bash"]);
    assert_contains(&out, "randomfast-cli");
}

#[test]
fn oversized_duration_is_refused() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, _) = run_cli_failure(home.path(), &["prefs", "add", "1e10"]);
    assert_contains(&stderr, "must be between");

    let prefs = parse_json(&run_cli_success(home.path(), &["prefs", "show", "--json"]));
    assert_eq!(prefs["timeframes"].as_array().unwrap().len(), 6);
    run_cli_success(home.path(), &["fast", "start"]);
}

#[test]
fn seed_beyond_toml_range_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, _) = run_cli_failure(
        home.path(),
        &["config", "set", "sampler.seed", "18446744073709551615"],
    );
    assert_contains(&stderr, "Invalid configuration value");
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "sampler.seed"]).trim(),
        "null"
    );
}
