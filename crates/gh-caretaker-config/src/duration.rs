//! Duration strings
//!
//! Parses and formats durations written the way GitHub workflow inputs carry
//! them: a sequence of `<number><unit>` pairs such as `24h`, `1h30m` or
//! `1.5d`. Supported units are `d`, `h`, `m` and `s`. A bare `0` is zero.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration '{0}', expected e.g. 24h, 1h30m or 90s")]
    Invalid(String),
}

fn unit_seconds(unit: &str) -> f64 {
    match unit {
        "d" => 86_400.0,
        "h" => 3_600.0,
        "m" => 60.0,
        _ => 1.0,
    }
}

/// Parse a duration string like `1h30m`
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    static FULL_REGEX: OnceLock<Regex> = OnceLock::new();
    static PART_REGEX: OnceLock<Regex> = OnceLock::new();

    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let full = FULL_REGEX
        .get_or_init(|| Regex::new(r"^(?:\d+(?:\.\d+)?[dhms])+$").unwrap());
    if !full.is_match(input) {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let part = PART_REGEX.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)([dhms])").unwrap());
    let mut seconds = 0.0_f64;
    for captures in part.captures_iter(input) {
        let value: f64 = captures[1]
            .parse()
            .map_err(|_| DurationError::Invalid(input.to_string()))?;
        seconds += value * unit_seconds(&captures[2]);
    }

    Duration::try_from_secs_f64(seconds).map_err(|_| DurationError::Invalid(input.to_string()))
}

/// Format a duration as the shortest `h`/`m`/`s` string (e.g. `1h30m`)
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total == 0 {
        return "0s".to_string();
    }

    let (hours, minutes, seconds) = (total / 3_600, (total % 3_600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    out
}

/// serde adapter so config files can write `stale_interval = "24h"`
pub mod serde_duration {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
