//! Preferences persistence and editing through the public API.

use randomfast_core::preferences::PREFERENCES_KEY;
use randomfast_core::{
    App, BlobStore, Database, PcgSource, PreferencesState, PreferencesStore, PreferencesUpdate, SystemClock,
    TimeframeDraft, TimeframeOption, DEFAULT_TIMEFRAMES,
};

#[test]
fn edited_weights_are_normalized_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("randomfast.db");

    {
        let db = Database::open_at(&path).unwrap();
        let mut store = PreferencesStore::open(&db, SystemClock).unwrap();
        store.initialize().unwrap();

        let mut draft = TimeframeDraft::new(vec![
            TimeframeOption::new(12.0, 1.0),
            TimeframeOption::new(16.0, 1.0),
        ]);
        draft.add(24.0).unwrap();
        draft.set_weight(2, 2.0).unwrap();
        store.update(draft.into_update().unwrap()).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let store = PreferencesStore::open(&db, SystemClock).unwrap();
    let weights: Vec<f64> = store.timeframes().iter().map(|o| o.weight).collect();
    assert_eq!(weights, vec![25.0, 25.0, 50.0]);
    assert!(store.allow_reroll());
}

#[test]
fn toggling_reroll_leaves_timeframes_alone() {
    let db = Database::open_memory().unwrap();
    let mut store = PreferencesStore::open(&db, SystemClock).unwrap();
    store.initialize().unwrap();

    store.update(PreferencesUpdate::allow_reroll(false)).unwrap();
    assert_eq!(store.timeframes(), &DEFAULT_TIMEFRAMES);

    store
        .update(PreferencesUpdate::timeframes(vec![TimeframeOption::new(30.0, 100.0)]))
        .unwrap();
    assert!(!store.allow_reroll());
}

#[test]
fn blob_without_allow_reroll_is_repaired_on_disk() {
    let db = Database::open_memory().unwrap();
    db.save(
        PREFERENCES_KEY,
        r#"{"preferences":{"timeframes":[{"duration":16,"likelihood":100}]}}"#,
    )
    .unwrap();

    let mut store = PreferencesStore::open(&db, SystemClock).unwrap();
    store.initialize().unwrap();

    let raw = db.load(PREFERENCES_KEY).unwrap().unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blob["preferences"]["allowReroll"], true);
    assert_eq!(blob["preferences"]["timeframes"][0]["duration"], 16.0);
}

#[test]
fn missing_blob_yields_defaults() {
    let db = Database::open_memory().unwrap();
    let store = PreferencesStore::open(&db, SystemClock).unwrap();
    assert_eq!(store.preferences(), &PreferencesState::default());
}

#[test]
fn oversized_duration_is_refused_everywhere() {
    let db = Database::open_memory().unwrap();
    let (mut app, _) = App::start(&db, SystemClock, PcgSource::seeded(3)).unwrap();

    let mut draft = TimeframeDraft::from_preferences(app.preferences.preferences());
    assert!(draft.add(1e10).is_err());
    assert!(app
        .preferences
        .update(PreferencesUpdate::timeframes(vec![TimeframeOption::new(1e10, 100.0)]))
        .is_err());
    assert!(app.fasts.create_fast(chrono::Utc::now(), 1e10).is_err());
    assert!(app.fasts.records().is_empty());
}

#[test]
fn oversized_duration_already_on_disk_does_not_break_rolls() {
    let db = Database::open_memory().unwrap();
    db.save(
        PREFERENCES_KEY,
        r#"{"preferences":{"timeframes":[{"duration":1e10,"likelihood":100}],"allowReroll":true}}"#,
    )
    .unwrap();

    let (mut app, _) = App::start(&db, SystemClock, PcgSource::seeded(3)).unwrap();
    assert_eq!(app.preferences.timeframes(), &DEFAULT_TIMEFRAMES);

    let roll = app.roll(chrono::Utc::now()).unwrap();
    assert!(DEFAULT_TIMEFRAMES
        .iter()
        .any(|o| o.duration_hours == roll.duration_hours));
    app.commit(&roll).unwrap();
}
