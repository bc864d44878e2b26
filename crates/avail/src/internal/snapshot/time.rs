use std::fmt::{Display, Formatter};

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Serialize, Serializer};

use crate::internal::common::error::AvailError;

/// Offset from "now" at which a set of nodes becomes available.
///
/// `Infinity` means "free with no known future claim" and sorts after every
/// finite offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeOffset {
    Seconds(u64),
    Infinity,
}

impl TimeOffset {
    /// Offset of an absolute `start` relative to `now`, or `None` when the
    /// start already lies in the past.
    pub fn between(now: i64, start: i64) -> Option<TimeOffset> {
        start
            .checked_sub(now)
            .and_then(|offset| u64::try_from(offset).ok())
            .map(TimeOffset::Seconds)
    }

    pub fn as_seconds(self) -> Option<u64> {
        match self {
            TimeOffset::Seconds(seconds) => Some(seconds),
            TimeOffset::Infinity => None,
        }
    }
}

impl Display for TimeOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeOffset::Seconds(seconds) => write!(f, "{seconds}"),
            TimeOffset::Infinity => f.write_str("infinity"),
        }
    }
}

impl Serialize for TimeOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TimeOffset::Seconds(seconds) => serializer.serialize_u64(*seconds),
            TimeOffset::Infinity => serializer.serialize_str("infinity"),
        }
    }
}

pub fn parse_pbs_datetime(datetime: &str) -> crate::Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(
        datetime.trim(),
        "%a %b %d %H:%M:%S %Y",
    )?)
}

pub fn local_to_epoch(datetime: NaiveDateTime) -> crate::Result<i64> {
    Local
        .from_local_datetime(&datetime)
        .earliest()
        .map(|time| time.timestamp())
        .ok_or_else(|| AvailError::InvalidTime(format!("{datetime} does not exist locally")))
}

/// Parses a timestamp attribute into epoch seconds.
///
/// Accepts either a leading epoch-seconds token (`1629378317` or
/// `1629378317 Thu Aug 19 13:05:17 2021`) or a PBS datetime in local time.
pub fn parse_timestamp(text: &str) -> crate::Result<i64> {
    let text = text.trim();
    if let Some(epoch) = text
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<i64>().ok())
    {
        return Ok(epoch);
    }
    local_to_epoch(parse_pbs_datetime(text)?)
}
