use std::time::Duration;

use chrono::{DateTime, Local};

use avail::snapshot::TimeOffset;

/// Renders an availability offset: `now`, a human duration, or `∞`.
pub fn human_offset(offset: TimeOffset) -> String {
    match offset {
        TimeOffset::Seconds(0) => "now".to_string(),
        TimeOffset::Seconds(seconds) => {
            // Whole minutes from one hour up
            let seconds = if seconds >= 3600 {
                seconds - seconds % 60
            } else {
                seconds
            };
            humantime::format_duration(Duration::from_secs(seconds)).to_string()
        }
        TimeOffset::Infinity => "∞".to_string(),
    }
}

/// Local `MM/DD/YYYY HH:MM` rendering of an epoch timestamp.
pub fn human_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime
            .with_timezone(&Local)
            .format("%m/%d/%Y %H:%M")
            .to_string(),
        None => timestamp.to_string(),
    }
}

/// Comma separated list of at most `limit` items, followed by the number of
/// items left out.
pub fn format_limited_list<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    let mut result = items
        .iter()
        .take(limit)
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > limit {
        result.push_str(&format!(", ... ({} more)", items.len() - limit));
    }
    result
}
