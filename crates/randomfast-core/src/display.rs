//! Text formatting for durations and countdowns.

use chrono::Duration;

/// Countdown label: `"1d 2h 3m 4s"` past a day, `"2h 3m 4s"` below,
/// `"Fast completed!"` once nothing remains.
pub fn format_remaining(remaining: Duration) -> String {
    if remaining.num_milliseconds() <= 0 {
        return "Fast completed!".to_string();
    }

    let total_secs = remaining.num_seconds();

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours >= 24 {
        format!("{}d {}h {minutes}m {seconds}s", hours / 24, hours % 24)
    } else {
        format!("{hours}h {minutes}m {seconds}s")
    }
}

/// Long form used for a chosen duration: `"16 hours"`, `"2 days"`,
/// `"1 day 12h"`.
pub fn format_duration_hours(hours: f64) -> String {
    if hours >= 24.0 {
        let days = (hours / 24.0).floor() as i64;
        let rest = hours % 24.0;
        let unit = if days > 1 { "days" } else { "day" };
        if rest == 0.0 {
            format!("{days} {unit}")
        } else {
            format!("{days} {unit} {}h", trim_hours(rest))
        }
    } else {
        format!("{} hours", trim_hours(hours))
    }
}

/// Compact form used in option lists: `"16h"`, `"2 days"`, `"1d 12h"`.
pub fn format_duration_compact(hours: f64) -> String {
    if hours >= 24.0 {
        let days = (hours / 24.0).floor() as i64;
        let rest = hours % 24.0;
        if rest == 0.0 {
            let unit = if days > 1 { "days" } else { "day" };
            format!("{days} {unit}")
        } else {
            format!("{days}d {}h", trim_hours(rest))
        }
    } else {
        format!("{}h", trim_hours(hours))
    }
}

fn trim_hours(hours: f64) -> String {
    let hours = (hours * 100.0).round() / 100.0;
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{hours}")
    }
}
