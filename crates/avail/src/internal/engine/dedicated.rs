use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::internal::common::error::AvailError;
use crate::internal::engine::projector::Timeline;
use crate::internal::snapshot::time::{TimeOffset, local_to_epoch};

const DEDICATED_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Scheduler maintenance blackout, in absolute epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedicatedWindow {
    pub start: i64,
    pub end: i64,
}

/// Parses a `MM/DD/YYYY HH:MM` timestamp in local time.
pub fn parse_dedicated_datetime(text: &str) -> crate::Result<i64> {
    let datetime = NaiveDateTime::parse_from_str(text.trim(), DEDICATED_TIME_FORMAT)?;
    local_to_epoch(datetime)
}

/// Parses the contents of a scheduler `dedicated_time` file.
///
/// Each non-empty line that is not a `#` comment holds one window:
/// `MM/DD/YYYY HH:MM MM/DD/YYYY HH:MM`.
pub fn parse_dedicated_time(text: &str) -> crate::Result<Vec<DedicatedWindow>> {
    let mut windows = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let invalid = |reason: &str| {
            AvailError::InvalidDedicatedTime(format!("line {}: {reason}: '{line}'", line_index + 1))
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [start_date, start_time, end_date, end_time] = tokens.as_slice() else {
            return Err(invalid("expected `MM/DD/YYYY HH:MM MM/DD/YYYY HH:MM`"));
        };
        let start = parse_dedicated_datetime(&format!("{start_date} {start_time}"))
            .map_err(|e| invalid(&e.to_string()))?;
        let end = parse_dedicated_datetime(&format!("{end_date} {end_time}"))
            .map_err(|e| invalid(&e.to_string()))?;
        if start > end {
            return Err(invalid("window ends before it starts"));
        }
        windows.push(DedicatedWindow { start, end });
    }
    Ok(windows)
}

/// The earliest window that has not ended yet at `now`.
pub fn next_window(windows: &[DedicatedWindow], now: i64) -> Option<DedicatedWindow> {
    windows
        .iter()
        .filter(|window| window.end > now)
        .min_by_key(|window| window.start)
        .copied()
}

/// Collapses every bucket that lies beyond the start of `window` (including
/// `Infinity`) onto the window start.
///
/// Without a window, or when the window has already started, the timeline is
/// returned unchanged.
pub fn clamp(timeline: Timeline, window: Option<&DedicatedWindow>, now: i64) -> Timeline {
    let Some(window) = window else {
        return timeline;
    };
    let Some(limit) = TimeOffset::between(now, window.start) else {
        log::debug!("Dedicated time starting at {} is already in progress", window.start);
        return timeline;
    };

    let mut clamped = Timeline::default();
    let mut beyond = Vec::new();
    for (offset, nodes) in timeline.into_buckets() {
        if offset > limit {
            beyond.extend(nodes);
        } else {
            clamped.extend(offset, nodes);
        }
    }
    if !beyond.is_empty() {
        log::debug!("{} node entries clamped to dedicated time at {limit}", beyond.len());
        clamped.extend(limit, beyond);
    }
    clamped
}
