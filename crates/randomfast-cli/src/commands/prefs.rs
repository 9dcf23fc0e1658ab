use clap::{Subcommand, ValueEnum};
use randomfast_core::display::format_duration_compact;
use randomfast_core::storage::Database;
use randomfast_core::{Config, PreferencesUpdate, TimeframeDraft};

use super::{open_app, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show timeframe options and the re-roll setting
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Allow or forbid re-rolling a sampled duration
    Reroll {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Add a timeframe option (hours)
    Add {
        hours: f64,
    },
    /// Remove the timeframe option at INDEX
    Remove {
        index: usize,
    },
    /// Set the weight of the timeframe option at INDEX
    Weight {
        index: usize,
        weight: f64,
    },
    /// Rescale weights so they sum to 100
    Normalize,
    /// Restore the default timeframes
    Reset,
}

pub fn run(action: PrefsAction, config: &Config) -> CliResult {
    let db = Database::open()?;
    let mut app = open_app(&db, config)?;
    let prefs = &mut app.preferences;

    match action {
        PrefsAction::Show { json } => {
            if json {
                return print_json(prefs.preferences());
            }
            let total: f64 = prefs.timeframes().iter().map(|o| o.weight).sum();
            for (i, option) in prefs.timeframes().iter().enumerate() {
                let share = if total > 0.0 {
                    option.weight / total * 100.0
                } else {
                    100.0 / prefs.timeframes().len() as f64
                };
                println!(
                    "{i:>2}  {:<10} weight {:>6}  ({share:.0}%)",
                    format_duration_compact(option.duration_hours),
                    option.weight,
                );
            }
            println!(
                "re-roll: {}",
                if prefs.allow_reroll() { "on" } else { "off" }
            );
            Ok(())
        }
        PrefsAction::Reroll { state } => {
            let allow = matches!(state, Switch::On);
            print_json(&prefs.update(PreferencesUpdate::allow_reroll(allow))?)
        }
        PrefsAction::Reset => print_json(&prefs.reset()?),
        edit => {
            let mut draft = TimeframeDraft::from_preferences(prefs.preferences());
            match edit {
                PrefsAction::Add { hours } => draft.add(hours)?,
                PrefsAction::Remove { index } => {
                    draft.remove(index)?;
                }
                PrefsAction::Weight { index, weight } => draft.set_weight(index, weight)?,
                _ => {}
            }
            let event = prefs.update(draft.into_update()?)?;
            print_json(&event)
        }
    }
}
