pub mod config;
pub mod fast;
pub mod prefs;

use std::error::Error;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use randomfast_core::{App, Config, Database, Event, PcgSource, SystemClock};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

pub type CliApp<'a> = App<&'a Database, SystemClock, PcgSource>;

/// Open both stores the way every app start does: repair preferences, then
/// reconcile the active fast.
pub fn open_app<'a>(db: &'a Database, config: &Config) -> Result<CliApp<'a>, Box<dyn Error>> {
    let rng = PcgSource::from_seed_option(config.sampler.seed);
    let (app, events) = App::start(db, SystemClock, rng)?;
    for event in &events {
        match event {
            Event::FastAutoCompleted { id, completed_at, .. } => {
                eprintln!(
                    "Fast {} reached its end time and was completed at {}.",
                    short_id(id),
                    local_time(*completed_at)
                );
            }
            other => tracing::debug!(event = ?other, "startup"),
        }
    }
    Ok(app.with_overlap_policy(config.fasts.overlap_policy))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Accepts RFC 3339 or a local `YYYY-MM-DDTHH:MM` / `YYYY-MM-DD HH:MM`.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(input) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .ok_or_else(|| format!("'{input}' does not exist in the local timezone").into());
        }
    }
    Err(format!("cannot parse '{input}' as a time (expected RFC 3339 or YYYY-MM-DDTHH:MM)").into())
}

pub fn local_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
