//! Time-of-day helpers for reservation slots.

use chrono::{Duration, NaiveTime, Timelike};

/// Adds `minutes` to a start time, returning `None` if the slot would
/// run past midnight.
pub fn end_of_slot(start: NaiveTime, minutes: i32) -> Option<NaiveTime> {
    if minutes < 0 {
        return None;
    }
    let (end, overflow) = start.overflowing_add_signed(Duration::minutes(minutes as i64));
    if overflow != 0 {
        return None;
    }
    Some(end)
}

/// Formats a time as `HH:MM`, dropping seconds.
pub fn format_hhmm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serde adapter serializing `NaiveTime` as `HH:MM`.
///
/// Use with `#[serde(with = "shared::time::hhmm")]`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time of day: {}", raw)))
    }
}
