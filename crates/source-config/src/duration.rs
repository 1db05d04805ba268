//! Duration parsing utilities.
//!
//! Durations in a source file can be written three ways:
//! - A mapping of parts that are summed: `{ minutes: 1, seconds: 30 }`
//! - A string with an optional unit suffix: `"300"`, `"300s"`, `"30m"`, `"1h"`, `"1d"`, `"250ms"`
//! - A bare number of seconds: `2.5`
//!
//! Use with `#[serde(with = "crate::duration")]` on `std::time::Duration` fields.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Error type for duration parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DurationError {
    #[error("Empty duration string")]
    Empty,

    #[error("Invalid duration value: {0}")]
    InvalidValue(String),

    #[error("Duration must not be negative: {0}")]
    Negative(String),

    #[error("Duration out of range: {0}")]
    OutOfRange(String),
}

/// Parse a duration string like "1h", "30m", "300s", "250ms" or "300".
///
/// Supports:
/// - Plain numbers (interpreted as seconds): "300", "2.5"
/// - Milliseconds suffix: "250ms"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
/// - Days suffix: "1d"
pub fn parse_duration(s: &str) -> Result<Duration, DurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    // "ms" has to be matched before "m" and "s"
    let (num_str, unit_secs) = if let Some(num_str) = s.strip_suffix("ms") {
        (num_str, 0.001)
    } else if let Some(num_str) = s.strip_suffix('d') {
        (num_str, 86_400.0)
    } else if let Some(num_str) = s.strip_suffix('h') {
        (num_str, 3_600.0)
    } else if let Some(num_str) = s.strip_suffix('m') {
        (num_str, 60.0)
    } else if let Some(num_str) = s.strip_suffix('s') {
        (num_str, 1.0)
    } else {
        (s, 1.0)
    };

    let value: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| DurationError::InvalidValue(s.to_string()))?;

    secs_to_duration(value * unit_secs, s)
}

fn secs_to_duration(secs: f64, raw: &str) -> Result<Duration, DurationError> {
    if secs.is_nan() {
        return Err(DurationError::InvalidValue(raw.to_string()));
    }
    if secs < 0.0 {
        return Err(DurationError::Negative(raw.to_string()));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| DurationError::OutOfRange(raw.to_string()))
}

/// Timedelta-style parts, summed into a single duration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DurationParts {
    #[serde(default)]
    weeks: f64,
    #[serde(default)]
    days: f64,
    #[serde(default)]
    hours: f64,
    #[serde(default)]
    minutes: f64,
    #[serde(default)]
    seconds: f64,
    #[serde(default)]
    milliseconds: f64,
    #[serde(default)]
    microseconds: f64,
}

impl DurationParts {
    fn total_seconds(&self) -> f64 {
        self.weeks * 604_800.0
            + self.days * 86_400.0
            + self.hours * 3_600.0
            + self.minutes * 60.0
            + self.seconds
            + self.milliseconds / 1_000.0
            + self.microseconds / 1_000_000.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationSpec {
    Seconds(f64),
    Text(String),
    Parts(DurationParts),
}

impl DurationSpec {
    fn into_duration(self) -> Result<Duration, DurationError> {
        match self {
            DurationSpec::Seconds(secs) => secs_to_duration(secs, &secs.to_string()),
            DurationSpec::Text(text) => parse_duration(&text),
            DurationSpec::Parts(parts) => {
                let secs = parts.total_seconds();
                secs_to_duration(secs, &format!("{parts:?}"))
            }
        }
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    DurationSpec::deserialize(deserializer)?
        .into_duration()
        .map_err(serde::de::Error::custom)
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}
