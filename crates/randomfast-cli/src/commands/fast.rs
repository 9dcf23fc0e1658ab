use std::io::Write;
use std::time::Duration as StdDuration;

use chrono::Utc;
use clap::Subcommand;
use randomfast_core::display::{format_duration_compact, format_duration_hours, format_remaining};
use randomfast_core::storage::Database;
use randomfast_core::{Config, FastProgress, FastStatus, Roll};
use serde_json::json;

use super::{local_time, open_app, parse_time, print_json, short_id, CliApp, CliResult};

#[derive(Subcommand)]
pub enum FastAction {
    /// Start a fast with the pending roll, or a fresh one
    Start {
        /// Start time (RFC 3339 or local YYYY-MM-DDTHH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Sample a candidate duration; re-rolls if one is already pending
    Roll {
        /// Start time (RFC 3339 or local YYYY-MM-DDTHH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Drop the pending candidate without starting
    Discard,
    /// Print the current fast and its progress as JSON
    Status,
    /// Show a live countdown for the current fast
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// End a fast (the current one by default)
    Complete {
        /// Fast ID
        id: Option<String>,
    },
    /// Delete a fast from history
    Delete {
        /// Fast ID
        id: String,
    },
    /// List all fasts, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dashboard counts
    Stats,
}

pub fn run(action: FastAction, config: &Config) -> CliResult {
    let db = Database::open()?;
    let mut app = open_app(&db, config)?;

    match action {
        FastAction::Start { at } => start(&mut app, at),
        FastAction::Roll { at } => roll(&mut app, at),
        FastAction::Discard => {
            app.clear_pending_roll()?;
            println!("Pending roll discarded.");
            Ok(())
        }
        FastAction::Status => {
            let now = Utc::now();
            match app.fasts.current_fast() {
                Some(fast) => print_json(&json!({
                    "fast": fast,
                    "progress": FastProgress::at(fast, now),
                })),
                None => print_json(&json!({ "fast": null })),
            }
        }
        FastAction::Watch { ticks } => watch(&app, config, ticks),
        FastAction::Complete { id } => {
            let id = match id {
                Some(id) => id,
                None => app
                    .fasts
                    .current_fast_id()
                    .map(str::to_string)
                    .ok_or("no active fast to complete")?,
            };
            match app.fasts.complete_fast(&id)? {
                Some(event) => print_json(&event),
                None => {
                    println!("No active fast with id {id}; nothing changed.");
                    Ok(())
                }
            }
        }
        FastAction::Delete { id } => match app.fasts.delete_fast(&id)? {
            Some(event) => print_json(&event),
            None => {
                println!("No fast with id {id}; nothing changed.");
                Ok(())
            }
        },
        FastAction::List { json } => {
            if json {
                return print_json(app.fasts.records());
            }
            if app.fasts.records().is_empty() {
                println!("No fasts yet. Start one with `randomfast-cli fast start`.");
                return Ok(());
            }
            let now = Utc::now();
            println!(
                "  {:<8}  {:<16}      {:<16}  {:<14} {:<10} status",
                "id", "start", "end", "planned", "actual"
            );
            for record in app.fasts.records() {
                let status = match record.status {
                    FastStatus::Active => "active",
                    FastStatus::Completed => "completed",
                };
                let marker = if app.fasts.current_fast_id() == Some(record.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {}  {}  ->  {}  {:<14} {:<10} {status}",
                    short_id(&record.id),
                    local_time(record.start_time),
                    local_time(record.end_time),
                    format_duration_hours(record.duration_hours),
                    format_duration_compact(record.actual_hours(now)),
                );
            }
            Ok(())
        }
        FastAction::Stats => print_json(&app.fasts.stats()),
    }
}

fn start(app: &mut CliApp<'_>, at: Option<String>) -> CliResult {
    let start_time = at.as_deref().map(parse_time).transpose()?;

    let roll = match app.pending_roll()? {
        Some(mut roll) => {
            if let Some(start_time) = start_time {
                roll.start_at(start_time)?;
            }
            roll
        }
        None => app.roll(start_time.unwrap_or_else(Utc::now))?,
    };

    let event = app.commit(&roll)?;
    eprintln!(
        "Fasting for {}, until {}.",
        format_duration_hours(roll.duration_hours),
        local_time(roll.end_time)
    );
    print_json(&event)
}

fn roll(app: &mut CliApp<'_>, at: Option<String>) -> CliResult {
    let start_time = at.as_deref().map(parse_time).transpose()?;

    let roll: Roll = match app.pending_roll()? {
        Some(mut roll) => {
            if let Some(start_time) = start_time {
                roll.start_at(start_time)?;
            }
            app.reroll(&mut roll)?;
            roll
        }
        None => app.roll(start_time.unwrap_or_else(Utc::now))?,
    };
    app.save_pending_roll(&roll)?;

    println!(
        "Rolled {} (ends {}).",
        format_duration_hours(roll.duration_hours),
        local_time(roll.end_time)
    );
    if app.preferences.allow_reroll() {
        println!("Run `fast roll` again to re-roll, or `fast start` to begin.");
    } else {
        println!("Run `fast start` to begin.");
    }
    Ok(())
}

/// Redraw the countdown once per refresh interval. Read-only: nothing is
/// saved, even when the fast comes due.
fn watch(app: &CliApp<'_>, config: &Config, ticks: Option<u64>) -> CliResult {
    let Some(fast) = app.fasts.current_fast() else {
        println!("No active fast.");
        return Ok(());
    };
    let interval = StdDuration::from_millis(config.display.refresh_interval_ms.max(100));
    let mut stdout = std::io::stdout();

    let mut shown = 0u64;
    loop {
        let progress = FastProgress::at(fast, Utc::now());
        write!(
            stdout,
            "\r{:>5.1}%  {:<24}",
            progress.progress_pct,
            format_remaining(chrono::Duration::milliseconds(progress.remaining_ms))
        )?;
        stdout.flush()?;
        shown += 1;

        if progress.is_due {
            writeln!(
                stdout,
                "\nTarget reached. The fast is recorded as completed at its end time on the next run."
            )?;
            break;
        }
        if ticks.is_some_and(|n| shown >= n) {
            writeln!(stdout)?;
            break;
        }
        std::thread::sleep(interval);
    }
    Ok(())
}
